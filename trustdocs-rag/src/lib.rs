//! # trustdocs-rag
//!
//! Retrieval-augmented question answering over a single uploaded document.
//!
//! ## Overview
//!
//! A document's text is split into overlapping character windows, each window
//! is embedded, and questions are answered from the most similar windows only.
//! Replies from the generative model are parsed into fixed JSON shapes and
//! degrade to deterministic fallbacks when the model misbehaves.
//!
//! - [`DocumentPipeline`] - upload, summary and question-answering workflows
//! - [`EmbeddingProvider`] / [`CompletionProvider`] - collaborator seams
//! - [`RiskMetadata`] - regex-based risk flags (dates, penalties, renewals, ...)
//! - [`MockEmbedder`] / [`MockCompletion`] - deterministic providers for testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trustdocs_rag::{DocumentPipeline, Language, RagConfig};
//! use trustdocs_rag::ollama::OllamaProvider;
//!
//! let ollama = Arc::new(OllamaProvider::new("http://localhost:11434")?);
//! let pipeline = DocumentPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(ollama.clone())
//!     .completion_provider(ollama)
//!     .build()?;
//!
//! pipeline.build_index(&contract_text, Language::English).await?;
//! let report = pipeline.ask_question("Can I cancel early?", Language::Spanish).await?;
//! println!("{} ({})", report.answer.simple_answer, report.confidence);
//! ```
//!
//! ## Features
//!
//! - `ollama` - [`OllamaProvider`](ollama::OllamaProvider) over the Ollama HTTP API
//! - `openai` - [`OpenAIProvider`](openai::OpenAIProvider) over OpenAI-compatible APIs

pub mod chunking;
pub mod completion;
pub mod confidence;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod language;
pub mod metadata;
pub mod mock;
#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod reply;
pub mod repository;
pub mod retriever;
pub mod synthesizer;
mod text;

pub use chunking::{Chunker, FixedSizeChunker, chunk_text};
pub use completion::{Completion, CompletionProvider};
pub use confidence::{Confidence, aggregate};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Chunk, ChunkId, Document, Evidence, IndexedChunk, RetrievalResult, SearchResult,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{EmbeddingIndex, cosine_similarity};
pub use language::{Language, LanguageProfile};
pub use metadata::{FlagDescription, RiskFlag, RiskMetadata, Severity};
pub use mock::{MockCompletion, MockEmbedder};
pub use pipeline::{
    AnswerReport, DocumentPipeline, DocumentPipelineBuilder, DocumentStatus, IndexReport,
    SummaryReport,
};
pub use prompt::PromptComposer;
pub use reply::{AnswerReply, StructuredReply, SummaryReply};
pub use repository::{ActiveDocument, DocumentRepository};
pub use retriever::Retriever;
pub use synthesizer::ResponseSynthesizer;
