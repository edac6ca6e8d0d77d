//! Command-line and environment configuration.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use trustdocs_rag::RagConfig;
use trustdocs_rag::ollama::OllamaConfig;
use trustdocs_rag::openai::OpenAIConfig;

/// Backend serving embeddings and completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Ollama,
    Openai,
}

/// TrustDocs HTTP server.
#[derive(Clone, Debug, Parser)]
#[command(name = "trustdocs-server", about = "Grounded Q&A over an uploaded document", version)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "TRUSTDOCS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Embedding and completion backend
    #[arg(long, env = "TRUSTDOCS_PROVIDER", value_enum, default_value_t = ProviderKind::Ollama)]
    pub provider: ProviderKind,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = trustdocs_rag::ollama::DEFAULT_BASE_URL)]
    pub ollama_url: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = trustdocs_rag::openai::DEFAULT_BASE_URL)]
    pub openai_url: String,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Embedding model name
    #[arg(long, env = "TRUSTDOCS_EMBEDDING_MODEL", default_value = "nomic-embed-text")]
    pub embedding_model: String,

    /// Completion model name
    #[arg(long, env = "TRUSTDOCS_COMPLETION_MODEL", default_value = "gemma3:1b")]
    pub completion_model: String,

    /// Sampling temperature for completions
    #[arg(long, env = "TRUSTDOCS_TEMPERATURE", default_value_t = 0.3)]
    pub temperature: f32,

    /// Timeout for each embedding or completion request, in seconds
    #[arg(long, env = "TRUSTDOCS_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size, in bytes
    #[arg(long, env = "TRUSTDOCS_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Characters per chunk
    #[arg(long, env = "TRUSTDOCS_CHUNK_SIZE", default_value_t = 1000)]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[arg(long, env = "TRUSTDOCS_CHUNK_OVERLAP", default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, env = "TRUSTDOCS_TOP_K", default_value_t = 3)]
    pub top_k: usize,

    /// Document characters included in summary prompts
    #[arg(long, env = "TRUSTDOCS_MAX_DOCUMENT_CHARS", default_value_t = 12_000)]
    pub max_document_chars: usize,

    /// Characters of chunk text quoted per evidence item
    #[arg(long, env = "TRUSTDOCS_EVIDENCE_CHARS", default_value_t = 400)]
    pub evidence_chars: usize,

    /// Characters of raw model output kept when an answer cannot be parsed
    #[arg(long, env = "TRUSTDOCS_ANSWER_FALLBACK_CHARS", default_value_t = 500)]
    pub answer_fallback_chars: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "TRUSTDOCS_LOG_JSON")]
    pub log_json: bool,
}

impl ServerConfig {
    /// Pipeline settings, validated.
    pub fn rag_config(&self) -> trustdocs_rag::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .top_k(self.top_k)
            .max_document_chars(self.max_document_chars)
            .evidence_chars(self.evidence_chars)
            .answer_fallback_chars(self.answer_fallback_chars)
            .build()
    }

    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            embedding_model: self.embedding_model.clone(),
            completion_model: self.completion_model.clone(),
            temperature: self.temperature,
            timeout: self.request_timeout(),
        }
    }

    /// OpenAI settings, `None` without an API key.
    pub fn openai_config(&self) -> Option<OpenAIConfig> {
        let api_key = self.openai_api_key.clone().filter(|k| !k.is_empty())?;
        Some(OpenAIConfig {
            api_key,
            base_url: self.openai_url.clone(),
            embedding_model: self.embedding_model.clone(),
            completion_model: self.completion_model.clone(),
            temperature: self.temperature,
            timeout: self.request_timeout(),
        })
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
