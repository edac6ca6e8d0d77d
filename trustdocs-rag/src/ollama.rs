//! Ollama provider for embeddings and completions.
//!
//! This module is only available when the `ollama` feature is enabled.
//!
//! - `POST {base}/api/embeddings` for embeddings
//! - `POST {base}/api/generate` for completions (`stream=false`)

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::{Completion, CompletionProvider};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "Ollama";

/// Default local Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Default completion model.
pub const DEFAULT_COMPLETION_MODEL: &str = "gemma3:1b";

/// Connection and model settings for [`OllamaProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            completion_model: DEFAULT_COMPLETION_MODEL.into(),
            temperature: 0.3,
            timeout: Duration::from_secs(120),
        }
    }
}

/// An [`EmbeddingProvider`] and [`CompletionProvider`] backed by a local
/// Ollama server.
///
/// # Example
///
/// ```rust,ignore
/// use trustdocs_rag::ollama::{OllamaConfig, OllamaProvider};
///
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OllamaProvider {
    client: reqwest::Client,
    config: OllamaConfig,
    url_embeddings: String,
    url_generate: String,
}

impl OllamaProvider {
    /// Create a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if the base URL is not an
    /// `http(s)` URL or the HTTP client cannot be built.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let base = config.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(RagError::Configuration(format!(
                "invalid Ollama base URL: '{}'",
                config.base_url
            )));
        }
        let base = base.trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url_embeddings: format!("{base}/api/embeddings"),
            url_generate: format!("{base}/api/generate"),
            config,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            error!(provider = PROVIDER, url, error = %e, "request failed");
            RagError::upstream(PROVIDER, format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.chars().take(240).collect());

            error!(provider = PROVIDER, url, %status, "API error");
            return Err(RagError::upstream(PROVIDER, format!("API returned {status}: {detail}")));
        }

        response.json().await.map_err(|e| {
            error!(provider = PROVIDER, url, error = %e, "failed to parse response");
            RagError::upstream(PROVIDER, format!("failed to parse response: {e}"))
        })
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

// ── Provider implementations ───────────────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            provider = PROVIDER,
            model = %self.config.embedding_model,
            text_len = text.len(),
            "embedding text"
        );

        let request = EmbeddingRequest { model: &self.config.embedding_model, prompt: text };
        let response: EmbeddingResponse = self.post(&self.url_embeddings, &request).await?;
        if response.embedding.is_empty() {
            return Err(RagError::upstream(PROVIDER, "API returned an empty embedding"));
        }
        Ok(response.embedding)
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
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

        let request = GenerateRequest {
            model: &self.config.completion_model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: self.config.temperature },
        };
        let response: GenerateResponse = self.post(&self.url_generate, &request).await?;
        Ok(Completion::new(response.response))
    }
}
