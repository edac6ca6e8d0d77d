//! OpenAI provider using the embeddings and chat completions APIs.
//!
//! This module is only available when the `openai` feature is enabled. The
//! base URL can point at any OpenAI-compatible server.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::{Completion, CompletionProvider};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "OpenAI";

/// The default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The default model for OpenAI embeddings.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The default chat model.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Connection and model settings for [`OpenAIProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Default models and endpoint with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            completion_model: DEFAULT_COMPLETION_MODEL.into(),
            temperature: 0.3,
            timeout: Duration::from_secs(120),
        }
    }
}

/// An [`EmbeddingProvider`] and [`CompletionProvider`] backed by the OpenAI
/// REST API.
///
/// Uses `reqwest` to call `/embeddings` and `/chat/completions` directly.
///
/// # Example
///
/// ```rust,ignore
/// use trustdocs_rag::openai::OpenAIProvider;
///
/// let provider = OpenAIProvider::from_env()?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIProvider {
    client: reqwest::Client,
    config: OpenAIConfig,
    url_embeddings: String,
    url_chat: String,
}

impl OpenAIProvider {
    /// Create a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if the API key is empty or the
    /// HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagError::Configuration("OpenAI API key must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let base = config.base_url.trim().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            url_embeddings: format!("{base}/embeddings"),
            url_chat: format!("{base}/chat/completions"),
            config,
        })
    }

    /// Create a provider using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::Configuration("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(OpenAIConfig::new(api_key))
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::upstream(PROVIDER, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::upstream(PROVIDER, format!("API returned {status}: {detail}")));
        }

        response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::upstream(PROVIDER, format!("failed to parse response: {e}"))
        })
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Provider implementations ───────────────────────────────────────

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagError::upstream(PROVIDER, "API returned empty response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.config.embedding_model,
            "embedding batch"
        );

        let request =
            EmbeddingRequest { model: &self.config.embedding_model, input: texts.to_vec() };
        let mut response: EmbeddingResponse = self.post(&self.url_embeddings, &request).await?;

        // The API may return entries out of order.
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        debug!(
            provider = PROVIDER,
            model = %self.config.completion_model,
            prompt_len = prompt.len(),
            "requesting completion"
        );

        let request = ChatRequest {
            model: &self.config.completion_model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.config.temperature,
        };
        let response: ChatResponse = self.post(&self.url_chat, &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(Completion::new)
            .ok_or_else(|| RagError::upstream(PROVIDER, "API returned no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        assert!(matches!(
            OpenAIProvider::new(OpenAIConfig::new("")),
            Err(RagError::Configuration(_))
        ));
    }

    #[test]
    fn base_url_is_overridable() {
        let config = OpenAIConfig {
            base_url: "http://localhost:8000/v1/".into(),
            ..OpenAIConfig::new("sk-test")
        };
        let provider = OpenAIProvider::new(config).unwrap();
        assert_eq!(provider.url_embeddings, "http://localhost:8000/v1/embeddings");
        assert_eq!(provider.url_chat, "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn embedding_response_is_reordered_by_index() {
        let body = r#"{"data": [
            {"embedding": [2.0], "index": 1},
            {"embedding": [1.0], "index": 0}
        ]}"#;
        let mut response: EmbeddingResponse = serde_json::from_str(body).unwrap();
        response.data.sort_by_key(|d| d.index);
        assert_eq!(response.data[0].embedding, vec![1.0]);
    }

    #[test]
    fn chat_reply_without_content_parses() {
        let body = r#"{"choices": [{"message": {"role": "assistant"}}]}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }
}
