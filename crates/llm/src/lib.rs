//! LLM integration crate for Katha.
//!
//! This crate provides a provider-agnostic abstraction for chat-style
//! language model calls and output safety classification.
//!
//! # Example
//! ```no_run
//! use katha_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = LlmRequest::new("gpt-4")
//!     .with_system("You are a storyteller.")
//!     .with_user("Tell me a short story about a clever crow.");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod moderation;
pub mod providers;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, create_moderation};
pub use moderation::{OpenAiModerationClient, SafetyClassifier};
pub use providers::OpenAiClient;
