//! Redact-then-watermark pipeline

use std::sync::Arc;

use tracing::debug;

use crate::engine::{LopdfEngine, PdfEngine};
use crate::error::PipelineError;
use crate::redaction::redact;
use crate::region::RedactionRegion;
use crate::temp_store::TempStore;
use crate::watermark::{watermark, WatermarkConfig};

/// Redact `regions` on page 1, then watermark every page.
///
/// The watermark stage only ever sees the redaction stage's output.
pub fn process(
    engine: &dyn PdfEngine,
    store: &TempStore,
    document: Vec<u8>,
    config: &WatermarkConfig,
    regions: &[RedactionRegion],
) -> Result<Vec<u8>, PipelineError> {
    let input_len = document.len();
    let redacted = redact(engine, store, document, regions)?;
    let output = watermark(engine, &redacted, config)?;

    debug!(
        "Processed document: {} regions, {} -> {} bytes",
        regions.len(),
        input_len,
        output.len()
    );
    Ok(output)
}

/// Immutable pipeline shared by every request.
#[derive(Clone)]
pub struct Pipeline {
    engine: Arc<dyn PdfEngine>,
    store: TempStore,
    watermark: WatermarkConfig,
}

impl Pipeline {
    pub fn new(engine: Arc<dyn PdfEngine>, store: TempStore, watermark: WatermarkConfig) -> Self {
        Self {
            engine,
            store,
            watermark,
        }
    }

    /// Pipeline backed by [`LopdfEngine`].
    pub fn with_lopdf(store: TempStore, watermark: WatermarkConfig) -> Self {
        Self::new(Arc::new(LopdfEngine::new()), store, watermark)
    }

    pub fn watermark_config(&self) -> &WatermarkConfig {
        &self.watermark
    }

    pub fn store(&self) -> &TempStore {
        &self.store
    }

    pub fn process(
        &self,
        document: Vec<u8>,
        regions: &[RedactionRegion],
    ) -> Result<Vec<u8>, PipelineError> {
        process(
            self.engine.as_ref(),
            &self.store,
            document,
            &self.watermark,
            regions,
        )
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("store", &self.store)
            .field("watermark", &self.watermark)
            .finish_non_exhaustive()
    }
}
