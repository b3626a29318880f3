//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use redact_core::PipelineError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the API. Every variant is answered in plain text.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base64 string: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("processing task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::Encoding(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Request failed: {}", message);
        } else {
            warn!("Rejected request: {}", message);
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use redact_core::{EngineError, RedactionError};

    #[test]
    fn test_client_errors_are_bad_request() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ApiError::from(decode).status(), StatusCode::BAD_REQUEST);

        let encoding = STANDARD.decode("not-base64!!").unwrap_err();
        let err = ApiError::from(encoding);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Invalid base64 string:"));
    }

    #[test]
    fn test_pipeline_error_is_server_error_with_stage_message() {
        let err = ApiError::from(PipelineError::Redaction(RedactionError::Annotation {
            index: 3,
            source: EngineError::ParseError("bad xref".into()),
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "failed to add redactions: failed to add annotation 3: Failed to parse PDF: bad xref"
        );
    }

    #[test]
    fn test_response_is_plain_text() {
        let response = ApiError::from(STANDARD.decode("@@@").unwrap_err()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );
    }
}
