//! Redaction stage
//!
//! Regions are applied as a left fold: each step hands the current temp file
//! to the engine, which writes a fresh file with one more black box on page 1.
//! The previous file is deleted as soon as its handle is replaced.

use tracing::debug;

use crate::engine::{PdfEngine, SquareAnnotation};
use crate::error::RedactionError;
use crate::pages::PageSelection;
use crate::region::RedactionRegion;
use crate::temp_store::TempStore;

/// Black out every region on page 1 of `document`.
///
/// An empty region list returns the document untouched without touching the
/// engine or the disk.
pub fn redact(
    engine: &dyn PdfEngine,
    store: &TempStore,
    document: Vec<u8>,
    regions: &[RedactionRegion],
) -> Result<Vec<u8>, RedactionError> {
    if regions.is_empty() {
        return Ok(document);
    }

    let input = store
        .write("input", &document)
        .map_err(|source| RedactionError::Io {
            op: "write temp input file",
            source,
        })?;
    let first_page = PageSelection::single(1);

    let last = regions
        .iter()
        .enumerate()
        .try_fold(input, |current, (index, region)| {
            let output = store.create("output").map_err(|source| RedactionError::Io {
                op: "create temp output file",
                source,
            })?;

            let rect = region.rect();
            if rect.is_degenerate() {
                debug!("Redaction {} has zero area: {:?}", index, rect);
            }

            let annotation = SquareAnnotation::redaction(index, rect);
            engine
                .add_annotation_file(current.path(), output.path(), &first_page, &annotation)
                .map_err(|source| RedactionError::Annotation { index, source })?;

            debug!("Applied redaction {} at {:?}", index, annotation.rect);
            Ok(output)
        })?;

    last.read().map_err(|source| RedactionError::Io {
        op: "read final output file",
        source,
    })
}
