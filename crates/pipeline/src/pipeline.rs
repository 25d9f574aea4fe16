//! Query pipeline orchestration.
//!
//! Sequences the two supported flows over injected service handles:
//!
//! - **Grounded**: intent classification, retrieval, relevance filtering,
//!   context assembly, grounded generation, optional moderation.
//! - **Freeform**: static story instruction, generation, mandatory
//!   moderation.
//!
//! Each query is one independent, sequential run. Every stage either
//! produces the next stage's input or fails the whole attempt with its
//! originating error kind; no partial result is ever returned.

use crate::intent::{self, QueryIntent};
use crate::moderate;
use katha_core::{AppError, AppResult, PipelineConfig};
use katha_llm::{LlmClient, LlmRequest, SafetyClassifier};
use katha_prompt::{grounded_instruction, TemplateSet};
use katha_retrieval::{filter_by_relevance, format_context, DocumentIndex};
use std::sync::Arc;
use uuid::Uuid;

/// Fixed answer returned when no retrieved passage clears the relevance
/// threshold. A sparse index degrades gracefully; this is a success, not
/// a failure.
pub const NO_CONTEXT_ANSWER: &str = "\
I do not have enough information to answer that. Please try asking about \
the stories in a different way.";

/// The query pipeline.
///
/// Holds stateless, shared service handles injected at construction time
/// plus the configuration read once at startup. Cheap to share across
/// concurrent queries; no stage mutates shared state.
pub struct QueryPipeline {
    llm: Arc<dyn LlmClient>,
    index: Arc<dyn DocumentIndex>,
    moderation: Arc<dyn SafetyClassifier>,
    templates: TemplateSet,
    model: String,
    config: PipelineConfig,
}

impl QueryPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        index: Arc<dyn DocumentIndex>,
        moderation: Arc<dyn SafetyClassifier>,
        templates: TemplateSet,
        model: impl Into<String>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            index,
            moderation,
            templates,
            model: model.into(),
            config,
        }
    }

    /// Answer a question over the document index.
    ///
    /// Self-referential queries are answered from the persona template
    /// without touching the index; persona answers are never moderated.
    pub async fn run_grounded(&self, index_id: &str, query: &str) -> AppResult<String> {
        let request_id = Uuid::new_v4();
        let query = validate_query(query)?;

        tracing::info!(%request_id, index = index_id, "Running grounded query");

        if self.config.classify_intent {
            let intent = intent::classify(self.llm.as_ref(), &self.model, query).await?;
            if intent == QueryIntent::SelfReference {
                tracing::info!(%request_id, "Query addresses the assistant, answering from persona");
                return self.generate(&self.templates.persona, query).await;
            }
        }

        let candidates = self
            .index
            .search(index_id, query, self.config.candidate_pool)
            .await?;
        tracing::debug!(%request_id, candidates = candidates.len(), "Retrieved candidate pool");

        let relevant = filter_by_relevance(
            candidates,
            self.config.min_score,
            self.config.max_context_docs,
        );
        let context = format_context(&relevant);

        if context.is_empty() {
            tracing::info!(%request_id, "No passage cleared the relevance threshold");
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        tracing::debug!(%request_id, passages = relevant.len(), "Assembled context");

        let instruction = grounded_instruction(&self.templates, &context)?;
        let answer = self.generate(&instruction, query).await?;

        if self.config.moderate_grounded {
            let outcome = moderate::moderate(self.moderation.as_ref(), answer).await?;
            return Ok(outcome.into_text());
        }

        Ok(answer)
    }

    /// Generate a freeform story for the query.
    ///
    /// No retrieval is involved and the output is always moderated.
    pub async fn run_freeform(&self, query: &str) -> AppResult<String> {
        let request_id = Uuid::new_v4();
        let query = validate_query(query)?;

        tracing::info!(%request_id, "Running freeform query");

        let story = self.generate(&self.templates.freeform, query).await?;
        let outcome = moderate::moderate(self.moderation.as_ref(), story).await?;

        Ok(outcome.into_text())
    }

    /// One round-trip generation call with the two-message structure.
    async fn generate(&self, instruction: &str, user_text: &str) -> AppResult<String> {
        let request = LlmRequest::new(&self.model)
            .with_system(instruction)
            .with_user(user_text);

        let response = self.llm.complete(&request).await?;

        Ok(response.content)
    }
}

/// Reject empty query text before any external call is made.
fn validate_query(query: &str) -> AppResult<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Query text must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderate::SAFE_RESPONSE;
    use katha_llm::{LlmResponse, LlmUsage};
    use katha_retrieval::RetrievedDocument;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// LLM double that pops scripted replies and records every request.
    struct FakeLlm {
        replies: Mutex<VecDeque<AppResult<String>>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl FakeLlm {
        fn new(replies: Vec<AppResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn system_instruction(&self, call: usize) -> String {
            self.requests.lock().unwrap()[call].messages[0].content.clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for FakeLlm {
        fn provider_name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());

            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Other("no scripted reply".to_string())));

            reply.map(|content| LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    /// Index double serving a fixed candidate pool.
    struct FakeIndex {
        documents: Vec<RetrievedDocument>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeIndex {
        fn with_documents(documents: Vec<RetrievedDocument>) -> Arc<Self> {
            Arc::new(Self {
                documents,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                documents: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl DocumentIndex for FakeIndex {
        async fn search(
            &self,
            _index_id: &str,
            _query: &str,
            limit: usize,
        ) -> AppResult<Vec<RetrievedDocument>> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(AppError::Retrieval("index unreachable".to_string()));
            }

            Ok(self.documents.iter().take(limit).cloned().collect())
        }
    }

    /// Classifier double with a fixed verdict.
    struct FakeModeration {
        flagged: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeModeration {
        fn verdict(flagged: bool) -> Arc<Self> {
            Arc::new(Self {
                flagged,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                flagged: false,
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SafetyClassifier for FakeModeration {
        async fn is_flagged(&self, _text: &str) -> AppResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(AppError::Moderation("classifier down".to_string()));
            }

            Ok(self.flagged)
        }
    }

    fn pipeline(
        llm: Arc<FakeLlm>,
        index: Arc<FakeIndex>,
        moderation: Arc<FakeModeration>,
        config: PipelineConfig,
    ) -> QueryPipeline {
        QueryPipeline::new(
            llm,
            index,
            moderation,
            TemplateSet::default(),
            "gpt-4",
            config,
        )
    }

    fn relevant_doc() -> RetrievedDocument {
        RetrievedDocument::new(
            "The crow dropped pebbles into the pot.",
            "thirsty_crow.pdf",
            "3",
            0.9,
        )
    }

    fn no_classify() -> PipelineConfig {
        PipelineConfig {
            classify_intent: false,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_retrieval() {
        let llm = FakeLlm::new(vec![]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let pipeline = pipeline(
            llm.clone(),
            index.clone(),
            FakeModeration::verdict(false),
            PipelineConfig::default(),
        );

        let result = pipeline.run_grounded("stories", "   ").await;

        match result {
            Err(err) => {
                assert!(matches!(err, AppError::InvalidInput(_)));
                assert!(err.is_client_error());
                assert_eq!(err.status_code(), 422);
            }
            Ok(_) => panic!("Expected invalid input error"),
        }
        // Rejected before any external call
        assert_eq!(index.call_count(), 0);
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn test_self_intent_answers_from_persona_without_retrieval() {
        let llm = FakeLlm::new(vec![
            Ok("Yes".to_string()),
            Ok("I am Katha, a storytelling assistant.".to_string()),
        ]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        // Even with grounded moderation on, persona answers skip it
        let config = PipelineConfig {
            moderate_grounded: true,
            ..PipelineConfig::default()
        };
        let moderation = FakeModeration::verdict(true);
        let pipeline = pipeline(llm.clone(), index.clone(), moderation.clone(), config);

        let answer = pipeline.run_grounded("stories", "Who are you?").await.unwrap();

        assert_eq!(answer, "I am Katha, a storytelling assistant.");
        assert_eq!(index.call_count(), 0);
        assert_eq!(moderation.call_count(), 0);
        assert_eq!(
            llm.system_instruction(1),
            TemplateSet::default().persona
        );
    }

    #[tokio::test]
    async fn test_content_intent_runs_grounded_flow() {
        let llm = FakeLlm::new(vec![
            Ok("No".to_string()),
            Ok("The crow dropped pebbles to raise the water.".to_string()),
        ]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let pipeline = pipeline(
            llm.clone(),
            index.clone(),
            FakeModeration::verdict(false),
            PipelineConfig::default(),
        );

        let answer = pipeline
            .run_grounded("stories", "What did the crow do?")
            .await
            .unwrap();

        assert_eq!(answer, "The crow dropped pebbles to raise the water.");
        assert_eq!(index.call_count(), 1);
        // The grounded instruction carries the passage and its provenance
        let instruction = llm.system_instruction(1);
        assert!(instruction.contains("The crow dropped pebbles into the pot."));
        assert!(instruction.contains("Source: thirsty_crow.pdf, page 3"));
    }

    #[tokio::test]
    async fn test_classification_disabled_skips_classifier() {
        let llm = FakeLlm::new(vec![Ok("An answer.".to_string())]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let pipeline = pipeline(
            llm.clone(),
            index.clone(),
            FakeModeration::verdict(false),
            no_classify(),
        );

        let answer = pipeline
            .run_grounded("stories", "What did the crow do?")
            .await
            .unwrap();

        assert_eq!(answer, "An answer.");
        // Exactly one model call: generation, no classification
        assert_eq!(llm.request_count(), 1);
        assert_eq!(index.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_relevant_context_short_circuits() {
        let llm = FakeLlm::new(vec![]);
        let index = FakeIndex::with_documents(vec![RetrievedDocument::new(
            "Unrelated passage.",
            "other.pdf",
            "1",
            0.2,
        )]);
        let pipeline = pipeline(
            llm.clone(),
            index.clone(),
            FakeModeration::verdict(false),
            no_classify(),
        );

        let answer = pipeline
            .run_grounded("stories", "What did the crow do?")
            .await
            .unwrap();

        // A fixed success message, with no generation call made
        assert_eq!(answer, NO_CONTEXT_ANSWER);
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_index_short_circuits() {
        let llm = FakeLlm::new(vec![]);
        let index = FakeIndex::with_documents(vec![]);
        let pipeline = pipeline(
            llm.clone(),
            index,
            FakeModeration::verdict(false),
            no_classify(),
        );

        let answer = pipeline
            .run_grounded("stories", "What did the crow do?")
            .await
            .unwrap();

        assert_eq!(answer, NO_CONTEXT_ANSWER);
    }

    #[tokio::test]
    async fn test_retrieval_failure_propagates() {
        let llm = FakeLlm::new(vec![]);
        let index = FakeIndex::failing();
        let pipeline = pipeline(
            llm,
            index,
            FakeModeration::verdict(false),
            no_classify(),
        );

        let result = pipeline.run_grounded("stories", "What did the crow do?").await;

        match result {
            Err(err) => {
                assert!(matches!(err, AppError::Retrieval(_)));
                assert_eq!(err.status_code(), 503);
            }
            Ok(_) => panic!("Expected retrieval error"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_generation_propagates() {
        let llm = FakeLlm::new(vec![Err(AppError::RateLimited("limit hit".to_string()))]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let pipeline = pipeline(
            llm,
            index,
            FakeModeration::verdict(false),
            no_classify(),
        );

        let result = pipeline.run_grounded("stories", "What did the crow do?").await;

        match result {
            Err(err) => {
                assert!(matches!(err, AppError::RateLimited(_)));
                assert!(!err.is_client_error());
            }
            Ok(_) => panic!("Expected rate limit error, got an answer"),
        }
    }

    #[tokio::test]
    async fn test_classification_failure_propagates() {
        let llm = FakeLlm::new(vec![Err(AppError::Upstream("model down".to_string()))]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let pipeline = pipeline(
            llm,
            index.clone(),
            FakeModeration::verdict(false),
            PipelineConfig::default(),
        );

        let result = pipeline.run_grounded("stories", "What did the crow do?").await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        // The failure happened during classification, before retrieval
        assert_eq!(index.call_count(), 0);
    }

    #[tokio::test]
    async fn test_grounded_moderation_applies_when_enabled() {
        let llm = FakeLlm::new(vec![Ok("A grim answer.".to_string())]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let config = PipelineConfig {
            classify_intent: false,
            moderate_grounded: true,
            ..PipelineConfig::default()
        };
        let moderation = FakeModeration::verdict(true);
        let pipeline = pipeline(llm, index, moderation.clone(), config);

        let answer = pipeline
            .run_grounded("stories", "What did the crow do?")
            .await
            .unwrap();

        assert_eq!(answer, SAFE_RESPONSE);
        assert_eq!(moderation.call_count(), 1);
    }

    #[tokio::test]
    async fn test_grounded_moderation_skipped_when_disabled() {
        let llm = FakeLlm::new(vec![Ok("An answer.".to_string())]);
        let index = FakeIndex::with_documents(vec![relevant_doc()]);
        let moderation = FakeModeration::verdict(true);
        let pipeline = pipeline(llm, index, moderation.clone(), no_classify());

        let answer = pipeline
            .run_grounded("stories", "What did the crow do?")
            .await
            .unwrap();

        assert_eq!(answer, "An answer.");
        assert_eq!(moderation.call_count(), 0);
    }

    #[tokio::test]
    async fn test_freeform_story_is_always_moderated() {
        let llm = FakeLlm::new(vec![Ok("Once upon a time.".to_string())]);
        let index = FakeIndex::with_documents(vec![]);
        let moderation = FakeModeration::verdict(false);
        let pipeline = pipeline(llm.clone(), index.clone(), moderation.clone(), no_classify());

        let story = pipeline.run_freeform("A story about a crow").await.unwrap();

        assert_eq!(story, "Once upon a time.");
        assert_eq!(moderation.call_count(), 1);
        assert_eq!(index.call_count(), 0);
        assert_eq!(
            llm.system_instruction(0),
            TemplateSet::default().freeform
        );
    }

    #[tokio::test]
    async fn test_freeform_flagged_story_replaced_verbatim() {
        let llm = FakeLlm::new(vec![Ok("Something unsafe.".to_string())]);
        let index = FakeIndex::with_documents(vec![]);
        let pipeline = pipeline(llm, index, FakeModeration::verdict(true), no_classify());

        let story = pipeline.run_freeform("A story about a crow").await.unwrap();

        assert_eq!(story, SAFE_RESPONSE);
    }

    #[tokio::test]
    async fn test_freeform_moderation_failure_hard_fails() {
        let llm = FakeLlm::new(vec![Ok("A story.".to_string())]);
        let index = FakeIndex::with_documents(vec![]);
        let pipeline = pipeline(llm, index, FakeModeration::failing(), no_classify());

        let result = pipeline.run_freeform("A story about a crow").await;

        // Never silently passed through unmoderated
        assert!(matches!(result, Err(AppError::Moderation(_))));
    }

    #[tokio::test]
    async fn test_freeform_empty_query_rejected() {
        let llm = FakeLlm::new(vec![]);
        let index = FakeIndex::with_documents(vec![]);
        let pipeline = pipeline(
            llm.clone(),
            index,
            FakeModeration::verdict(false),
            no_classify(),
        );

        let result = pipeline.run_freeform("").await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn test_candidate_pool_requested_not_final_cap() {
        let llm = FakeLlm::new(vec![Ok("An answer.".to_string())]);
        let many_docs: Vec<RetrievedDocument> = (0..20)
            .map(|i| {
                RetrievedDocument::new(
                    format!("Passage {}.", i),
                    format!("doc{}.pdf", i),
                    "1",
                    0.9 - (i as f32) * 0.001,
                )
            })
            .collect();
        let index = FakeIndex::with_documents(many_docs);
        let pipeline = pipeline(
            llm.clone(),
            index,
            FakeModeration::verdict(false),
            no_classify(),
        );

        pipeline
            .run_grounded("stories", "What happened?")
            .await
            .unwrap();

        // Context is capped even though the pool was larger
        let instruction = llm.system_instruction(0);
        let default_cap = PipelineConfig::default().max_context_docs;
        let passages = instruction.matches("Source: ").count();
        assert_eq!(passages, default_cap);
    }
}
