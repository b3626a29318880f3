//! PDF engine primitives
//!
//! The pipeline depends on exactly three operations, collected in the
//! [`PdfEngine`] trait:
//! - add a square annotation to pages of a file-backed document
//! - build an image watermark from an image path and a layout description
//! - stamp a watermark onto pages of an in-memory document
//!
//! [`LopdfEngine`] implements them on top of lopdf.

mod annotation;
mod descriptor;
mod image;
mod stamp;

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::EngineError;
use crate::pages::PageSelection;

pub use annotation::{BorderStyle, Rgb, SquareAnnotation};
pub use descriptor::{Placement, Position, ScaleMode, Unit, WatermarkDescriptor};
pub use image::{ColorSpace, WatermarkImage};
pub use stamp::{Watermark, STAMP_KEY};

/// The PDF operations the redaction/watermark pipeline is built on.
pub trait PdfEngine: Send + Sync {
    /// Add `annotation` to the selected pages of the document at `input`,
    /// writing the result to `output`.
    fn add_annotation_file(
        &self,
        input: &Path,
        output: &Path,
        pages: &PageSelection,
        annotation: &SquareAnnotation,
    ) -> Result<(), EngineError>;

    /// Build an image watermark from an image file and a layout description
    /// such as `"scale:0.6 rel, pos:c, rot:0, op:0.1"`.
    fn image_watermark(
        &self,
        image_path: &Path,
        description: &str,
        on_top: bool,
        update: bool,
        unit: Unit,
    ) -> Result<Watermark, EngineError>;

    /// Stamp `watermark` onto the selected pages of `input`.
    fn add_watermarks(
        &self,
        input: &[u8],
        pages: &PageSelection,
        watermark: &Watermark,
    ) -> Result<Vec<u8>, EngineError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for LopdfEngine {
    fn add_annotation_file(
        &self,
        input: &Path,
        output: &Path,
        pages: &PageSelection,
        annotation: &SquareAnnotation,
    ) -> Result<(), EngineError> {
        let mut doc = Document::load(input)
            .map_err(|e| EngineError::ParseError(format!("{}: {}", input.display(), e)))?;

        for (page_num, page_id) in selected_pages(&doc, pages)? {
            annotation::add_to_page(&mut doc, page_id, annotation)?;
            debug!("Added annotation {} to page {}", annotation.name, page_num);
        }

        doc.save(output)
            .map_err(|e| EngineError::SaveError(format!("{}: {}", output.display(), e)))?;
        Ok(())
    }

    fn image_watermark(
        &self,
        image_path: &Path,
        description: &str,
        on_top: bool,
        update: bool,
        unit: Unit,
    ) -> Result<Watermark, EngineError> {
        let descriptor = WatermarkDescriptor::parse(description, unit)?;
        let image = WatermarkImage::open(image_path)?;
        debug!(
            "Loaded watermark image {} ({}x{})",
            image_path.display(),
            image.width,
            image.height
        );

        Ok(Watermark {
            descriptor,
            image,
            on_top,
            update,
        })
    }

    fn add_watermarks(
        &self,
        input: &[u8],
        pages: &PageSelection,
        watermark: &Watermark,
    ) -> Result<Vec<u8>, EngineError> {
        let mut doc =
            Document::load_mem(input).map_err(|e| EngineError::ParseError(e.to_string()))?;

        let pages = selected_pages(&doc, pages)?;
        stamp::apply(&mut doc, &pages, watermark)?;
        debug!("Watermarked {} pages", pages.len());

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| EngineError::SaveError(e.to_string()))?;
        Ok(output)
    }
}

/// Resolve a selection to `(page number, page object)` pairs.
fn selected_pages(
    doc: &Document,
    selection: &PageSelection,
) -> Result<Vec<(u32, ObjectId)>, EngineError> {
    let all = doc.get_pages();
    let count = all.len() as u32;

    let pages: Vec<(u32, ObjectId)> = selection
        .resolve(count)
        .into_iter()
        .filter_map(|n| all.get(&n).map(|id| (n, *id)))
        .collect();

    if pages.is_empty() {
        return Err(EngineError::NoPagesSelected { count });
    }
    Ok(pages)
}

/// Follow a single level of indirection.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(*v as f64),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inherited keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    // Depth limit guards against cyclic Parent chains in malformed files.
    for _ in 0..32 {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value));
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

const LETTER: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page MediaBox as `[llx, lly, urx, ury]`, US Letter when absent or malformed.
fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let Some(Object::Array(values)) = inherited(doc, page_id, b"MediaBox") else {
        return LETTER;
    };
    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| as_number(resolve(doc, v)))
        .collect();
    match numbers.as_slice() {
        [x1, y1, x2, y2] => [x1.min(*x2), y1.min(*y2), x1.max(*x2), y1.max(*y2)],
        _ => LETTER,
    }
}
