//! Document pipeline orchestrator.
//!
//! The [`DocumentPipeline`] is the single entry point consumers use. It owns
//! the [`DocumentRepository`] and composes a [`Chunker`], an
//! [`EmbeddingProvider`] and a [`CompletionProvider`] into the upload,
//! summary and question-answering workflows.
//!
//! # Example
//!
//! ```rust,ignore
//! use trustdocs_rag::{DocumentPipeline, Language, RagConfig};
//!
//! let pipeline = DocumentPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(embedder)
//!     .completion_provider(completer)
//!     .build()?;
//!
//! pipeline.build_index(&text, Language::English).await?;
//! let report = pipeline.ask_question("When is rent due?", Language::Spanish).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::completion::CompletionProvider;
use crate::confidence::{Confidence, aggregate};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, Evidence};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::EmbeddingIndex;
use crate::language::Language;
use crate::metadata::RiskMetadata;
use crate::prompt::PromptComposer;
use crate::reply::{AnswerReply, SummaryReply};
use crate::repository::{ActiveDocument, DocumentRepository};
use crate::retriever::Retriever;
use crate::synthesizer::ResponseSynthesizer;
use crate::text::char_len;

/// Outcome of indexing an uploaded document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    pub document_id: Uuid,
    /// Length of the document text in characters.
    pub text_length: usize,
    /// Number of chunks in the new index.
    pub chunks: usize,
    pub language: Language,
    /// Summary generated in the upload language.
    pub summary: SummaryReply,
    pub metadata: RiskMetadata,
}

/// A grounded answer with the evidence it was built from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReport {
    pub answer: AnswerReply,
    pub evidence: Vec<Evidence>,
    pub confidence: Confidence,
    pub question: String,
    pub language: Language,
    /// Summary previously generated for `language`, if any.
    pub summary: Option<SummaryReply>,
    pub metadata: RiskMetadata,
}

/// Summary of the active document together with its risk flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub document_id: Uuid,
    pub summary: SummaryReply,
    pub metadata: RiskMetadata,
    pub language: Language,
}

/// Snapshot of the active document for health reporting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub document_id: Uuid,
    pub indexed_at: DateTime<Utc>,
    pub chunks: usize,
    pub text_length: usize,
    pub language: Language,
    pub metadata: RiskMetadata,
}

/// The document pipeline orchestrator.
///
/// Coordinates indexing (chunk → embed → extract → summarise → replace) and
/// question answering (embed → search → synthesise → cite). Construct one
/// via [`DocumentPipeline::builder()`].
pub struct DocumentPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    repository: Arc<DocumentRepository>,
    retriever: Retriever,
    synthesizer: ResponseSynthesizer,
}

impl DocumentPipeline {
    /// Create a new [`DocumentPipelineBuilder`].
    pub fn builder() -> DocumentPipelineBuilder {
        DocumentPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return the repository holding the active document.
    pub fn repository(&self) -> &Arc<DocumentRepository> {
        &self.repository
    }

    /// Index `text` and make it the active document.
    ///
    /// The previous document, its index and its cached summaries are
    /// discarded only once the new index is complete.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] for blank text and
    /// [`RagError::Upstream`] if embedding fails. A failed completion does not
    /// fail the upload; the summary degrades to its fallback.
    pub async fn build_index(&self, text: &str, language: Language) -> Result<IndexReport> {
        if text.trim().is_empty() {
            return Err(RagError::InvalidInput("document text is empty".to_string()));
        }

        let chunks = self.chunker.chunk(text);
        let chunk_count = chunks.len();
        let index =
            EmbeddingIndex::build(chunks, self.embedding_provider.as_ref()).await.map_err(|e| {
                error!(chunk_count, error = %e, "indexing failed");
                e
            })?;

        let document = Document::new(text, language);
        let summary = self.synthesizer.summarize(&document.text, language).await;
        let metadata = document.metadata;

        let active = ActiveDocument::new(document, index);
        active.store_summary(language, summary.clone()).await;
        let active = self.repository.replace(active).await;

        let report = IndexReport {
            document_id: active.id(),
            text_length: char_len(text),
            chunks: active.index().len(),
            language,
            summary,
            metadata,
        };
        info!(
            document.id = %report.document_id,
            text_length = report.text_length,
            chunk_count = report.chunks,
            language = %language,
            "indexed document"
        );
        Ok(report)
    }

    /// Summary of the active document in `language`, with its risk flags.
    ///
    /// Summaries are generated once per language and cached on the document.
    /// Summary and flags always come from the same document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocument`] before the first upload.
    pub async fn get_summary(&self, language: Language) -> Result<SummaryReport> {
        let active = self.repository.current().await.ok_or(RagError::NoDocument)?;
        let summary = match active.summary(language).await {
            Some(summary) => summary,
            None => {
                let summary =
                    self.synthesizer.summarize(&active.document().text, language).await;
                active.store_summary(language, summary.clone()).await;
                info!(document.id = %active.id(), language = %language, "generated summary");
                summary
            }
        };

        Ok(SummaryReport {
            document_id: active.id(),
            summary,
            metadata: active.document().metadata,
            language,
        })
    }

    /// Answer `question` from the active document in `language`.
    ///
    /// Retrieval, synthesis and citation all run against one snapshot of the
    /// active document, even if another upload replaces it meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] for a blank question,
    /// [`RagError::NoDocument`] before the first upload and
    /// [`RagError::Upstream`] if the question cannot be embedded.
    pub async fn ask_question(&self, question: &str, language: Language) -> Result<AnswerReport> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("question is empty".to_string()));
        }

        let active = self.repository.current().await.ok_or(RagError::NoDocument)?;
        let results = self.retriever.retrieve_in(&active, question, self.config.top_k).await?;

        let context: Vec<Chunk> = results.iter().map(|r| r.chunk.clone()).collect();
        let answer = self.synthesizer.answer(question, &context, language).await;

        let evidence = Evidence::from_results(&results, self.config.evidence_chars);
        let confidence = aggregate(&evidence);
        info!(
            document.id = %active.id(),
            evidence_count = evidence.len(),
            %confidence,
            language = %language,
            "answered question"
        );

        Ok(AnswerReport {
            answer,
            evidence,
            confidence,
            question: question.to_string(),
            language,
            summary: active.summary(language).await,
            metadata: active.document().metadata,
        })
    }

    /// Risk flags of the active document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocument`] before the first upload.
    pub async fn get_metadata(&self) -> Result<RiskMetadata> {
        let active = self.repository.current().await.ok_or(RagError::NoDocument)?;
        Ok(active.document().metadata)
    }

    /// Status of the active document, `None` before the first upload.
    pub async fn status(&self) -> Option<DocumentStatus> {
        let active = self.repository.current().await?;
        let document = active.document();
        Some(DocumentStatus {
            document_id: active.id(),
            indexed_at: active.indexed_at(),
            chunks: active.index().len(),
            text_length: char_len(&document.text),
            language: document.language,
            metadata: document.metadata,
        })
    }
}

/// Builder for constructing a [`DocumentPipeline`].
///
/// `config`, `embedding_provider` and `completion_provider` are required.
/// Without an explicit `chunker`, a [`FixedSizeChunker`] is built from the
/// config.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = DocumentPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .completion_provider(Arc::new(completer))
///     .chunker(Arc::new(chunker))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct DocumentPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    completion_provider: Option<Arc<dyn CompletionProvider>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl DocumentPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the completion provider.
    pub fn completion_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion_provider = Some(provider);
        self
    }

    /// Override the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`DocumentPipeline`], validating the config and that all
    /// required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if a required field is missing or
    /// the config is invalid.
    pub fn build(self) -> Result<DocumentPipeline> {
        let config = self
            .config
            .ok_or_else(|| RagError::Configuration("config is required".to_string()))?;
        config.validate()?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::Configuration("embedding_provider is required".to_string())
        })?;
        let completion_provider = self.completion_provider.ok_or_else(|| {
            RagError::Configuration("completion_provider is required".to_string())
        })?;
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        let repository = Arc::new(DocumentRepository::new());
        let retriever = Retriever::new(Arc::clone(&embedding_provider), Arc::clone(&repository));
        let synthesizer = ResponseSynthesizer::new(
            completion_provider,
            PromptComposer::new(config.max_document_chars),
            config.answer_fallback_chars,
        );

        Ok(DocumentPipeline {
            config,
            embedding_provider,
            chunker,
            repository,
            retriever,
            synthesizer,
        })
    }
}
