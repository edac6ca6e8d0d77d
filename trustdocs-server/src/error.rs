//! Mapping from pipeline errors to HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use trustdocs_rag::RagError;

/// Error returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request is unusable as sent.
    #[error("{0}")]
    BadRequest(String),

    /// The body could not be read or decoded as JSON.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Rag(#[from] RagError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Rag(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            ApiError::Rag(RagError::Upstream { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Rag(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message safe to show to end users.
    fn user_message(&self) -> &str {
        match self {
            ApiError::BadRequest(message) => message.as_str(),
            ApiError::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "Request body too large"
            }
            ApiError::Rejected { message, .. } => message.as_str(),
            ApiError::Rag(RagError::NoDocument | RagError::EmptyIndex) => {
                "No document uploaded. Please upload a document first."
            }
            ApiError::Rag(RagError::InvalidInput(message)) => message.as_str(),
            ApiError::Rag(RagError::Upstream { .. }) => "AI service unavailable",
            ApiError::Rag(_) => "Internal server error",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }

        let body = ErrorBody { error: self.user_message(), details: self.to_string() };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_classes_to_status_codes() {
        assert_eq!(ApiError::from(RagError::NoDocument).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(RagError::InvalidInput("question is empty".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RagError::upstream("Ollama", "connection refused")).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(RagError::Configuration("bad".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_details_carry_the_underlying_message() {
        let err = ApiError::from(RagError::upstream("Ollama", "connection refused"));
        assert_eq!(err.user_message(), "AI service unavailable");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn rejected_bodies_keep_their_status() {
        let too_large = ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        assert_eq!(too_large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.user_message(), "Request body too large");

        let unsupported = ApiError::Rejected {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: "Expected request with `Content-Type: application/json`".into(),
        };
        assert_eq!(unsupported.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(unsupported.user_message().contains("Content-Type"));
    }
}
