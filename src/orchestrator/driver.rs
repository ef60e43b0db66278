//! # Transformation Driver Module
//!
//! The sequential per-run loop: drives every selected item through the
//! job state machine while calling the codec engine.
//!
//! ## Failure isolation:
//! One item's engine failure is recorded on that item's result and the
//! loop continues - a bad input file never aborts the batch. This is the
//! central contract of the whole system.
//!
//! ## Sequencing:
//! Items are processed strictly one at a time, in registry order. The
//! engine is a single shared unit with no documented reentrancy guarantee,
//! so the driver awaits each item's outcome before starting the next.

use crate::{
    config::{BatchConfig, TransformMode},
    engine::CodecEngine,
    error::BatchError,
    job::{JobBoard, TransformationResult},
    orchestrator::progress_tracker::ProgressTracker,
    registry::SelectedItem,
};
use tracing::{debug, warn};

/// Runs one batch over a fixed item snapshot
pub struct BatchDriver<'a> {
    engine: &'a CodecEngine,
}

impl<'a> BatchDriver<'a> {
    pub fn new(engine: &'a CodecEngine) -> Self {
        Self { engine }
    }

    /// Transform every item sequentially and return the full result set.
    ///
    /// Fails fast with `EngineUnavailable` before any state is created if
    /// the engine has not finished loading; per-item failures after that
    /// point are absorbed into the result set.
    pub async fn run(
        &self,
        items: &[SelectedItem],
        config: &BatchConfig,
        tracker: &ProgressTracker,
    ) -> Result<Vec<TransformationResult>, BatchError> {
        if !self.engine.is_ready() {
            return Err(BatchError::EngineUnavailable);
        }

        let mut board = JobBoard::initialize(items, config.target_format);

        for (index, item) in items.iter().enumerate() {
            board.mark_running(&item.id);
            tracker.item_started(index, item).await;
            debug!(
                "Transforming {} ({} bytes) -> {}",
                item.source_name,
                item.size(),
                config.target_format
            );

            let input = item.bytes.clone();
            let outcome = match config.mode {
                TransformMode::Convert => {
                    self.engine.convert(input, config.target_format).await
                }
                TransformMode::Compress { quality } => {
                    self.engine
                        .compress(input, config.target_format, quality)
                        .await
                }
                TransformMode::Resize { scale } => {
                    self.engine.resize(input, config.target_format, scale).await
                }
            };

            match outcome {
                Ok(output_bytes) => {
                    board.mark_succeeded(&item.id, output_bytes);
                }
                Err(e) => {
                    // Record and move on; the batch never stops here
                    warn!("Transformation failed for {}: {}", item.source_name, e);
                    board.mark_failed(&item.id, e.to_string());
                }
            }

            if let Some(result) = board.get(&item.id) {
                tracker.item_finished(result).await;
            }
        }

        Ok(board.into_results())
    }
}
