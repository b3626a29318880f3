use std::io;

use thiserror::Error;

use crate::pages::PageSelectionError;

/// Failures raised by the PDF engine primitives.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("page selection matches no pages (document has {count} pages)")]
    NoPagesSelected { count: u32 },

    #[error("Invalid page selection: {0}")]
    PageSelection(#[from] PageSelectionError),

    #[error("Invalid watermark description: {0}")]
    InvalidDescription(String),

    #[error("Unsupported watermark image {0}: only PNG is supported")]
    UnsupportedImage(String),

    #[error("Failed to decode watermark image: {0}")]
    InvalidImage(String),

    #[error("document already watermarked")]
    AlreadyWatermarked,

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}

/// Failures of the redaction stage. Step failures carry the region index.
#[derive(Error, Debug)]
pub enum RedactionError {
    #[error("failed to add annotation {index}: {source}")]
    Annotation {
        index: usize,
        #[source]
        source: EngineError,
    },

    #[error("failed to {op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("error creating watermark: {0}")]
    Create(#[source] EngineError),

    #[error("could not add watermark to pdf: {0}")]
    Apply(#[source] EngineError),
}

/// Pipeline failure, tagged with the stage that failed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to add redactions: {0}")]
    Redaction(#[from] RedactionError),

    #[error("failed to add watermark: {0}")]
    Watermark(#[from] WatermarkError),
}
