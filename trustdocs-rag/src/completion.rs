//! Completion provider trait for the generative model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Raw text produced by the completion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    /// The model's reply, which may or may not be well-formed JSON.
    pub text: String,
}

impl Completion {
    /// Wrap a reply text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A service that completes a prompt with free text.
///
/// Callers make exactly one request per prompt; implementations must not
/// retry on their own.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Send `prompt` to the model and return its reply.
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}
