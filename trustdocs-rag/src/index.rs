//! In-memory embedding index using cosine similarity.
//!
//! [`EmbeddingIndex`] owns every [`IndexedChunk`] of one document. It is
//! immutable once built: replacing the active document means building a new
//! index and swapping it in through the
//! [`DocumentRepository`](crate::repository::DocumentRepository).

use std::cmp::Ordering;

use tracing::{debug, error};

use crate::document::{Chunk, IndexedChunk, RetrievalResult, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Chunks of a single document with their embeddings.
///
/// # Example
///
/// ```rust,ignore
/// use trustdocs_rag::index::EmbeddingIndex;
///
/// let index = EmbeddingIndex::build(chunks, provider.as_ref()).await?;
/// let results = index.search(&query_embedding, 3)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
}

impl EmbeddingIndex {
    /// Embed every chunk and store the `(chunk, vector)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Upstream`] if the embedding service fails, returns
    /// the wrong number of vectors, or returns vectors of inconsistent or zero
    /// dimensionality.
    pub async fn build(chunks: Vec<Chunk>, provider: &dyn EmbeddingProvider) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self::default());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = provider.embed_batch(&texts).await.map_err(|e| {
            error!(provider = provider.name(), error = %e, "embedding failed while building index");
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::upstream(
                provider.name(),
                format!("expected {} embeddings, got {}", chunks.len(), embeddings.len()),
            ));
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 {
            return Err(RagError::upstream(
                provider.name(),
                "embedding service returned an empty vector",
            ));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(RagError::upstream(
                provider.name(),
                format!("inconsistent embedding dimensions: {} and {}", dimensions, bad.len()),
            ));
        }

        let entries: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
            .collect();
        debug!(chunk_count = entries.len(), dimensions, "built embedding index");

        Ok(Self { entries, dimensions })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the stored embeddings (0 for an empty index).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The indexed chunks in document order.
    pub fn entries(&self) -> &[IndexedChunk] {
        &self.entries
    }

    /// Return the `top_k` chunks most similar to `query`.
    ///
    /// Results are sorted by descending cosine similarity; equal scores are
    /// ordered by ascending chunk id. The result holds `min(top_k, len())`
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if nothing has been indexed and
    /// [`RagError::Upstream`] if the query vector's dimensionality does not
    /// match the index.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<RetrievalResult> {
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if query.len() != self.dimensions {
            return Err(RagError::upstream(
                "embedding",
                format!(
                    "query embedding has {} dimensions, index has {}",
                    query.len(),
                    self.dimensions
                ),
            ));
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        scored.sort_by(compare_results);
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Descending score, then ascending chunk id.
fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.chunk.id.cmp(&b.chunk.id))
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the result is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b);
    if score.is_finite() { score } else { 0.0 }
}
