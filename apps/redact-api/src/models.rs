//! Request and response models

use redact_core::RedactionRegion;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/v1/candidate-resume-pdf`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedactRequest {
    /// Standard (padded) base64 of the PDF bytes
    pub pdf_string: String,
    /// Regions to black out on page 1, applied in order. Missing or `null`
    /// means none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub matched_texts: Vec<RedactionRegion>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
