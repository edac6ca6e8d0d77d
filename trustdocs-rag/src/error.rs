//! Error types for the `trustdocs-rag` crate.

use thiserror::Error;

/// Errors that can occur while indexing a document or answering questions about it.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunker or pipeline parameters.
    ///
    /// Raised when configuration is validated, which normally happens once at
    /// startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A search was issued against an index that holds no entries.
    #[error("Index is empty: build it from a document before searching")]
    EmptyIndex,

    /// No document has been uploaded yet.
    #[error("No document uploaded. Please upload a document first.")]
    NoDocument,

    /// The caller supplied unusable input, such as an empty question.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding or completion service failed.
    #[error("Upstream service error ({service}): {message}")]
    Upstream {
        /// The collaborator that produced the error.
        service: String,
        /// A description of the failure.
        message: String,
    },

    /// The completion service returned a reply that does not match the
    /// requested JSON shape. Recovered inside the synthesizer.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RagError {
    /// Build an [`RagError::Upstream`] from any displayable message.
    pub fn upstream(service: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Upstream { service: service.into(), message: message.to_string() }
    }

    /// Returns `true` when the error is caused by the caller and can be fixed
    /// by the caller, e.g. by uploading a document first.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::EmptyIndex | Self::NoDocument | Self::InvalidInput(_))
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_are_classified() {
        assert!(RagError::NoDocument.is_user_error());
        assert!(RagError::EmptyIndex.is_user_error());
        assert!(RagError::InvalidInput("empty question".into()).is_user_error());
        assert!(!RagError::upstream("ollama", "connection refused").is_user_error());
        assert!(!RagError::Configuration("bad".into()).is_user_error());
    }

    #[test]
    fn upstream_error_keeps_underlying_message() {
        let err = RagError::upstream("OpenAI", "API returned 503");
        assert_eq!(err.to_string(), "Upstream service error (OpenAI): API returned 503");
    }
}
