//! Single-slot holder for the active document and its index.
//!
//! At most one document is active at a time. A new upload is fully indexed
//! before [`DocumentRepository::replace`] swaps it in, so readers observe
//! either the old document or the new one, never a half-built index.
//! Readers hold an `Arc` snapshot, so a query that started before a
//! replacement finishes against the document it started with.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::document::Document;
use crate::index::EmbeddingIndex;
use crate::language::Language;
use crate::reply::SummaryReply;

/// A fully indexed document plus the summaries generated for it.
#[derive(Debug)]
pub struct ActiveDocument {
    id: Uuid,
    document: Document,
    index: EmbeddingIndex,
    indexed_at: DateTime<Utc>,
    summaries: RwLock<HashMap<Language, SummaryReply>>,
}

impl ActiveDocument {
    /// Wrap a document and its built index under a fresh id.
    pub fn new(document: Document, index: EmbeddingIndex) -> Self {
        Self {
            id: Uuid::new_v4(),
            document,
            index,
            indexed_at: Utc::now(),
            summaries: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn indexed_at(&self) -> DateTime<Utc> {
        self.indexed_at
    }

    /// The summary cached for `language`, if one was generated.
    pub async fn summary(&self, language: Language) -> Option<SummaryReply> {
        self.summaries.read().await.get(&language).cloned()
    }

    /// Cache a summary for `language`, replacing any previous one.
    pub async fn store_summary(&self, language: Language, summary: SummaryReply) {
        self.summaries.write().await.insert(language, summary);
    }
}

/// Holds the one active document. Last upload wins.
#[derive(Debug, Default)]
pub struct DocumentRepository {
    slot: RwLock<Option<Arc<ActiveDocument>>>,
}

impl DocumentRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically make `document` the active document, discarding the
    /// previous one and its index.
    pub async fn replace(&self, document: ActiveDocument) -> Arc<ActiveDocument> {
        let document = Arc::new(document);
        let previous = self.slot.write().await.replace(Arc::clone(&document));
        info!(
            document.id = %document.id(),
            previous.id = ?previous.map(|p| p.id()),
            chunk_count = document.index().len(),
            "active document replaced"
        );
        document
    }

    /// Snapshot of the active document, or `None` before the first upload.
    pub async fn current(&self) -> Option<Arc<ActiveDocument>> {
        self.slot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(text: &str) -> ActiveDocument {
        ActiveDocument::new(Document::new(text, Language::English), EmbeddingIndex::default())
    }

    #[tokio::test]
    async fn starts_empty() {
        assert!(DocumentRepository::new().current().await.is_none());
    }

    #[tokio::test]
    async fn replace_discards_previous_document() {
        let repository = DocumentRepository::new();
        let first = repository.replace(active("first")).await;
        let second = repository.replace(active("second")).await;

        let current = repository.current().await.unwrap();
        assert_eq!(current.id(), second.id());
        assert_ne!(current.id(), first.id());
        assert_eq!(current.document().text, "second");
        // Earlier snapshots stay readable.
        assert_eq!(first.document().text, "first");
    }

    #[tokio::test]
    async fn summaries_are_cached_per_language() {
        let document = active("text");
        document.store_summary(Language::Spanish, SummaryReply::fallback(Language::Spanish)).await;

        assert!(document.summary(Language::Spanish).await.is_some());
        assert!(document.summary(Language::English).await.is_none());
    }
}
