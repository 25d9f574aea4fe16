//! Katha Core Library
//!
//! This crate provides the foundational utilities for the Katha query
//! service:
//! - Error handling (`AppError`, `AppResult`) with HTTP-style status mapping
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, PipelineConfig};
pub use error::{AppError, AppResult};
