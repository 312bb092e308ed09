//! Text-generation provider clients.
//!
//! This module provides a trait-based abstraction over text-generation
//! providers, with Google Gemini as the primary implementation.

mod error;
mod gemini;

pub use error::{classify_http_status, LlmError, LlmErrorKind};
pub use gemini::GeminiClient;

use async_trait::async_trait;

/// Trait for text-generation providers.
///
/// One prompt in, the provider's full text response out. Implementations
/// perform a single best-effort round trip; no retry or caching happens at
/// this layer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a prompt and await the complete text response.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
