//! Resume redaction and watermarking
//!
//! This crate blacks out caller-supplied text regions on the first page of a
//! PDF and stamps an image watermark over every page, using lopdf.
//!
//! - `redaction::redact`: one square annotation per region, applied as a fold
//!   over temp files
//! - `watermark::watermark`: one image watermark over all pages
//! - `pipeline::process` / `Pipeline`: both stages in sequence

pub mod engine;
pub mod error;
pub mod pages;
pub mod pipeline;
pub mod redaction;
pub mod region;
pub mod temp_store;
pub mod watermark;

pub use engine::{LopdfEngine, PdfEngine, Position, ScaleMode, SquareAnnotation, Unit, Watermark};
pub use error::{EngineError, PipelineError, RedactionError, WatermarkError};
pub use pages::{PageSelection, PageSelectionError};
pub use pipeline::{process, Pipeline};
pub use redaction::redact;
pub use region::{PdfRect, RedactionRegion};
pub use temp_store::{TempPdf, TempStore};
pub use watermark::{watermark, WatermarkConfig, DEFAULT_WATERMARK_IMAGE};

