//! Question-to-chunks retrieval against the active document.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::repository::{ActiveDocument, DocumentRepository};

/// Embeds a question and searches the active document's index.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    repository: Arc<DocumentRepository>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, repository: Arc<DocumentRepository>) -> Self {
        Self { embedder, repository }
    }

    /// Retrieve the `k` chunks most similar to `question`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NoDocument`] before the first upload and
    /// [`RagError::Upstream`] if the question cannot be embedded.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<RetrievalResult> {
        let active = self.repository.current().await.ok_or(RagError::NoDocument)?;
        self.retrieve_in(&active, question, k).await
    }

    /// Like [`retrieve`](Self::retrieve), against a snapshot the caller
    /// already holds.
    pub async fn retrieve_in(
        &self,
        active: &ActiveDocument,
        question: &str,
        k: usize,
    ) -> Result<RetrievalResult> {
        let query = self.embedder.embed(question).await.map_err(|e| {
            error!(provider = self.embedder.name(), error = %e, "query embedding failed");
            e
        })?;

        let results = active.index().search(&query, k)?;
        debug!(
            document.id = %active.id(),
            requested = k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "retrieved chunks"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::chunking::chunk_text;
    use crate::document::{ChunkId, Document};
    use crate::index::EmbeddingIndex;
    use crate::language::Language;

    /// Counts vowels and consonants so similar texts land close together.
    struct LetterEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LetterEmbedder {
        fn name(&self) -> &str {
            "letters"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count() as f32;
            let others = text.chars().filter(|c| c.is_alphabetic()).count() as f32 - vowels;
            Ok(vec![vowels, others])
        }
    }

    #[tokio::test]
    async fn fails_before_any_document() {
        let retriever =
            Retriever::new(Arc::new(LetterEmbedder), Arc::new(DocumentRepository::new()));
        let err = retriever.retrieve("x", 3).await.unwrap_err();
        assert!(matches!(err, RagError::NoDocument));
    }

    #[tokio::test]
    async fn retrieves_from_active_document() {
        let repository = Arc::new(DocumentRepository::new());
        let text = "aaaa bbbb eeee cccc";
        let chunks = chunk_text(text, 5, 0).unwrap();
        let index = EmbeddingIndex::build(chunks, &LetterEmbedder).await.unwrap();
        repository
            .replace(ActiveDocument::new(Document::new(text, Language::English), index))
            .await;

        let retriever = Retriever::new(Arc::new(LetterEmbedder), repository);
        let results = retriever.retrieve("ii", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        // All-vowel chunks tie at 1.0; lower id wins.
        assert_eq!(results[0].chunk.id, ChunkId(0));
        assert_eq!(results[1].chunk.id, ChunkId(2));
    }
}
