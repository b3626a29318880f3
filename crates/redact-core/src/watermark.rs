//! Watermark stage
//!
//! Stamps one image over every page of a document in a single engine call.

use std::path::PathBuf;

use tracing::debug;

use crate::engine::{PdfEngine, Position, ScaleMode, Unit, WatermarkDescriptor};
use crate::error::{EngineError, WatermarkError};
use crate::pages::PageSelection;

/// Path of the logo stamped on every resume, relative to the working directory.
pub const DEFAULT_WATERMARK_IMAGE: &str = "images/brain-logo-watermark.png";

/// How the watermark image is laid out on each page.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkConfig {
    pub image_path: PathBuf,
    pub scale: f64,
    pub scale_mode: ScaleMode,
    pub position: Position,
    /// Offset from the anchor, in `unit`.
    pub offset: (f64, f64),
    /// Degrees, counter-clockwise.
    pub rotation: f64,
    pub opacity: f64,
    pub behind_content: bool,
    /// Replace a watermark left by an earlier run instead of failing.
    pub update_existing: bool,
    pub unit: Unit,
    /// Pages to stamp, every page by default.
    pub pages: PageSelection,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from(DEFAULT_WATERMARK_IMAGE),
            scale: 0.6,
            scale_mode: ScaleMode::Relative,
            position: Position::Center,
            offset: (0.0, 0.0),
            rotation: 0.0,
            opacity: 0.1,
            behind_content: false,
            update_existing: false,
            unit: Unit::Points,
            pages: PageSelection::all(),
        }
    }
}

impl WatermarkConfig {
    /// Render the layout as an engine description string.
    pub fn description(&self) -> String {
        format!(
            "scale:{} {}, pos:{}, off:{} {}, rot:{}, op:{}",
            self.scale,
            self.scale_mode.code(),
            self.position,
            self.offset.0,
            self.offset.1,
            self.rotation,
            self.opacity
        )
    }

    /// Check the layout without touching the image or any document.
    pub fn validate(&self) -> Result<WatermarkDescriptor, EngineError> {
        WatermarkDescriptor::parse(&self.description(), self.unit)
    }
}

/// Overlay the configured watermark on every page of `document`.
pub fn watermark(
    engine: &dyn PdfEngine,
    document: &[u8],
    config: &WatermarkConfig,
) -> Result<Vec<u8>, WatermarkError> {
    let description = config.description();
    let stamp = engine
        .image_watermark(
            &config.image_path,
            &description,
            !config.behind_content,
            config.update_existing,
            config.unit,
        )
        .map_err(WatermarkError::Create)?;

    let output = engine
        .add_watermarks(document, &config.pages, &stamp)
        .map_err(WatermarkError::Apply)?;

    debug!(
        "Watermarked document with {} ({})",
        config.image_path.display(),
        description
    );
    Ok(output)
}
