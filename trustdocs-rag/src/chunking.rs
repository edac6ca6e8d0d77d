//! Document chunking.
//!
//! Documents are split into overlapping fixed-size windows measured in
//! characters. Consecutive chunks start `chunk_size - chunk_overlap`
//! characters apart, so every character of the text lands in at least one
//! chunk and neighbouring chunks share exactly `chunk_overlap` characters.

use crate::document::{Chunk, ChunkId};
use crate::error::{RagError, Result};

/// A strategy for splitting document text into chunks.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks ordered by position.
    ///
    /// Returns an empty `Vec` for empty text.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Splits text into fixed-size windows with a fixed overlap.
///
/// # Example
///
/// ```rust
/// use trustdocs_rag::chunking::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(1000, 200).unwrap();
/// let chunks = chunker.chunk(&"a".repeat(2500));
/// let offsets: Vec<usize> = chunks.iter().map(|c| c.offset).collect();
/// assert_eq!(offsets, vec![0, 800, 1600]);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] unless `chunk_size > chunk_overlap`.
    /// Without that guarantee the window would never advance.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size <= chunk_overlap {
            return Err(RagError::Configuration(format!(
                "chunk_size ({chunk_size}) must be greater than chunk_overlap ({chunk_overlap})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Distance between the offsets of consecutive chunks.
    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        // Byte position of every char start, plus the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(idx, _)| idx).chain(std::iter::once(text.len())).collect();
        let total_chars = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            chunks.push(Chunk {
                id: ChunkId(chunks.len()),
                text: text[boundaries[start]..boundaries[end]].to_string(),
                offset: start,
            });
            if end == total_chars {
                break;
            }
            start += self.step();
        }
        chunks
    }
}

/// Split `text` into overlapping windows of `chunk_size` characters.
///
/// # Errors
///
/// Returns [`RagError::Configuration`] if `chunk_size <= chunk_overlap`,
/// whatever the text.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<Chunk>> {
    Ok(FixedSizeChunker::new(chunk_size, chunk_overlap)?.chunk(text))
}
