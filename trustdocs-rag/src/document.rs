//! Data types for documents, chunks, retrieval results and evidence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::language::Language;
use crate::metadata::RiskMetadata;
use crate::text::{collapse_whitespace, ellipsize};

/// The uploaded document: raw extracted text plus what is derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The extracted text content.
    pub text: String,
    /// Language the user asked for when uploading.
    pub language: Language,
    /// Risk flags derived from `text`.
    pub metadata: RiskMetadata,
}

impl Document {
    /// Create a document, deriving its metadata from the text.
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        let text = text.into();
        let metadata = RiskMetadata::extract(&text);
        Self { text, language, metadata }
    }
}

/// Sequence-ordered chunk identifier, rendered as `chunk_<n>`.
///
/// Ordering follows the chunk's position in the document, which makes it
/// usable as a deterministic tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(pub usize);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk_{}", self.0)
    }
}

impl FromStr for ChunkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("chunk_")
            .and_then(|n| n.parse().ok())
            .map(ChunkId)
            .ok_or_else(|| format!("invalid chunk id '{s}'"))
    }
}

impl Serialize for ChunkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChunkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A contiguous window of a [`Document`]'s text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Position of the chunk in the document's chunk sequence.
    pub id: ChunkId,
    /// The text content of the chunk.
    pub text: String,
    /// Start index of the chunk, in characters from the start of the document.
    pub offset: usize,
}

/// A [`Chunk`] together with its embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The embedding for the chunk's text.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity between the query and the chunk (higher is more relevant).
    pub score: f32,
}

/// Search results ordered by descending score, ties broken by ascending chunk id.
pub type RetrievalResult = Vec<SearchResult>;

/// A passage cited in support of an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Whitespace-collapsed, truncated chunk text.
    pub text: String,
    /// Similarity score of the chunk.
    pub score: f32,
    /// Identifier of the cited chunk.
    pub chunk_id: ChunkId,
    /// 1-based position in the retrieval result.
    pub rank: usize,
}

impl Evidence {
    /// Convert ranked search results into evidence, quoting at most
    /// `max_chars` characters of each chunk.
    pub fn from_results(results: &[SearchResult], max_chars: usize) -> Vec<Evidence> {
        results
            .iter()
            .enumerate()
            .map(|(idx, result)| Evidence {
                text: ellipsize(&collapse_whitespace(&result.chunk.text), max_chars),
                score: result.score,
                chunk_id: result.chunk.id,
                rank: idx + 1,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: usize, text: &str, score: f32) -> SearchResult {
        SearchResult { chunk: Chunk { id: ChunkId(id), text: text.into(), offset: 0 }, score }
    }

    #[test]
    fn chunk_id_round_trips_through_json() {
        let json = serde_json::to_string(&ChunkId(7)).unwrap();
        assert_eq!(json, "\"chunk_7\"");
        let back: ChunkId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChunkId(7));
        assert!("chunk_x".parse::<ChunkId>().is_err());
    }

    #[test]
    fn evidence_is_ranked_and_cleaned() {
        let results =
            vec![result(4, "  Late   fees\napply ", 0.91), result(1, "x".repeat(20).as_str(), 0.5)];
        let evidence = Evidence::from_results(&results, 10);

        assert_eq!(evidence[0].rank, 1);
        assert_eq!(evidence[0].chunk_id, ChunkId(4));
        assert_eq!(evidence[0].text, "Late fees...");
        assert_eq!(evidence[1].rank, 2);
        assert_eq!(evidence[1].text, format!("{}...", "x".repeat(10)));
    }

    #[test]
    fn evidence_serializes_with_camel_case_fields() {
        let evidence = Evidence::from_results(&[result(2, "text", 0.25)], 100);
        let value = serde_json::to_value(&evidence[0]).unwrap();
        assert_eq!(value["chunkId"], "chunk_2");
        assert_eq!(value["rank"], 1);
        assert_eq!(value["text"], "text");
    }
}
