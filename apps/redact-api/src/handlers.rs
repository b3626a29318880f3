//! HTTP request handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{HealthResponse, RedactRequest};
use crate::server::AppState;

/// Filename offered to the client for the processed resume.
pub const RESUME_FILENAME: &str = "candidate-resume.pdf";

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Redact the matched regions on page 1 and watermark every page.
///
/// The body is read as raw bytes so any content type is accepted.
pub async fn candidate_resume_pdf(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, [(header::HeaderName, String); 3], Vec<u8>), ApiError> {
    info!(body_bytes = body.len(), "PDF POST request received");

    let request: RedactRequest = serde_json::from_slice(&body)?;
    info!(regions = request.matched_texts.len(), "Decoded PDF request");

    let pdf = decode_pdf(&request.pdf_string)?;
    debug!("Decoded {} PDF bytes", pdf.len());

    let pipeline = state.pipeline.clone();
    let regions = request.matched_texts;
    let output =
        tokio::task::spawn_blocking(move || pipeline.process(pdf, &regions)).await??;

    info!("Returning processed PDF ({} bytes)", output.len());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", RESUME_FILENAME),
            ),
            (header::CONTENT_LENGTH, output.len().to_string()),
        ],
        output,
    ))
}

/// Decode standard base64, skipping the CR/LF of line-wrapped (MIME) input.
pub fn decode_pdf(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if !encoded.contains(['\r', '\n']) {
        return STANDARD.decode(encoded);
    }
    let unwrapped: Vec<u8> = encoded
        .bytes()
        .filter(|b| !matches!(b, b'\r' | b'\n'))
        .collect();
    STANDARD.decode(unwrapped)
}
