//! Configuration for the document pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for chunking, retrieval and prompt budgets.
///
/// All lengths are measured in characters (Unicode scalar values).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Window size of each chunk.
    pub chunk_size: usize,
    /// Number of characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved as grounding context for an answer.
    pub top_k: usize,
    /// Maximum number of document characters included in a summary prompt.
    ///
    /// Text beyond this prefix is not seen by the completion service when
    /// summarising. Question answering is unaffected: it works from retrieved
    /// chunks, which cover the whole document.
    pub max_document_chars: usize,
    /// Maximum length of the chunk text quoted in each piece of evidence.
    pub evidence_chars: usize,
    /// Length of the raw reply prefix used when an answer cannot be parsed.
    pub answer_fallback_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            max_document_chars: 12_000,
            evidence_chars: 400,
            answer_fallback_chars: 500,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Configuration`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `max_document_chars == 0`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Configuration("top_k must be greater than zero".to_string()));
        }
        if self.max_document_chars == 0 {
            return Err(RagError::Configuration(
                "max_document_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the chunk window size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the document truncation limit used in summary prompts.
    pub fn max_document_chars(mut self, chars: usize) -> Self {
        self.config.max_document_chars = chars;
        self
    }

    /// Set the maximum length of quoted evidence text.
    pub fn evidence_chars(mut self, chars: usize) -> Self {
        self.config.evidence_chars = chars;
        self
    }

    /// Set the length of the raw reply prefix used for fallback answers.
    pub fn answer_fallback_chars(mut self, chars: usize) -> Self {
        self.config.answer_fallback_chars = chars;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_applies_values() {
        let config = RagConfig::builder()
            .chunk_size(256)
            .chunk_overlap(50)
            .top_k(5)
            .max_document_chars(4000)
            .evidence_chars(120)
            .answer_fallback_chars(80)
            .build()
            .unwrap();
        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_document_chars, 4000);
        assert_eq!(config.evidence_chars, 120);
        assert_eq!(config.answer_fallback_chars, 80);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        let result = RagConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }

    #[test]
    fn rejects_zero_top_k() {
        assert!(matches!(RagConfig::builder().top_k(0).build(), Err(RagError::Configuration(_))));
    }

    #[test]
    fn rejects_zero_document_budget() {
        let result = RagConfig::builder().max_document_chars(0).build();
        assert!(matches!(result, Err(RagError::Configuration(_))));
    }
}
