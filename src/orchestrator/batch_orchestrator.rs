//! # Batch Orchestrator Facade
//!
//! Owns the moving parts of a batch session - item registry, codec engine,
//! configuration and the last run's result set - and exposes the five
//! operations the presentation layer consumes: `add_files`, `remove`,
//! `clear`, `run` and `package`, plus read-only `stats` and `snapshot`
//! views.
//!
//! ## Ownership rules:
//! - Preview handles belong to the registry alone; the orchestrator only
//!   forwards `remove`/`clear`
//! - The result set is replaced wholesale by each run and invalidated by
//!   any new selection; aggregate statistics are always derived on demand
//! - `run` takes `&mut self`, so two runs can never overlap on one
//!   registry - the exclusivity the shared result set requires is enforced
//!   by the borrow checker instead of a runtime queue

use crate::{
    archive::{ArchiveAssembler, ArchiveOutput},
    config::BatchConfig,
    engine::{CodecEngine, EngineState},
    error::{BatchError, EngineError},
    events::JsonMessage,
    job::TransformationResult,
    orchestrator::{driver::BatchDriver, progress_tracker::ProgressTracker},
    registry::{ItemRegistry, RawFile, SelectedItem},
    stats::BatchStats,
};
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

/// Read-only view of one selected item
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub id: String,
    pub name: String,
    pub mime: String,
    pub size: u64,
}

/// Read-only view of the whole session for the presentation layer
#[derive(Debug, Serialize)]
pub struct BatchSnapshot {
    pub items: Vec<ItemSummary>,
    pub results: Vec<TransformationResult>,
    pub stats: BatchStats,
}

/// Facade tying registry, engine, config and results together
pub struct BatchOrchestrator {
    config: BatchConfig,
    registry: ItemRegistry,
    engine: CodecEngine,
    results: Vec<TransformationResult>,
}

impl BatchOrchestrator {
    /// Create a session with an unloaded engine; call `load_engine()`
    /// before the first run
    pub fn new(config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: ItemRegistry::new(),
            engine: CodecEngine::new(),
            results: Vec::new(),
        })
    }

    /// One-time asynchronous engine load
    pub async fn load_engine(&mut self) -> Result<(), EngineError> {
        self.engine.load().await
    }

    pub fn engine_state(&self) -> &EngineState {
        self.engine.state()
    }

    /// Append selected files; a new selection invalidates the previous
    /// run's results
    pub fn add_files(&mut self, raw_files: Vec<RawFile>) -> Vec<String> {
        self.results.clear();
        let ids = self.registry.add(raw_files);
        debug!("Selection now holds {} items", self.registry.len());
        ids
    }

    /// Remove one item and release its preview handle
    pub fn remove(&mut self, id: &str) {
        self.registry.remove(id);
    }

    /// Drop the whole selection and the last result set
    pub fn clear(&mut self) {
        self.registry.clear();
        self.results.clear();
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.registry.items()[..]
    }

    pub fn results(&self) -> &[TransformationResult] {
        &self.results
    }

    pub fn active_previews(&self) -> usize {
        self.registry.active_previews()
    }

    /// Swap run parameters between runs; the current result set is kept
    /// until the next run or selection change
    pub fn set_config(&mut self, config: BatchConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run one batch over the current selection and keep the result set
    pub async fn run(&mut self) -> Result<BatchStats, BatchError> {
        if !self.engine.is_ready() {
            return Err(BatchError::EngineUnavailable);
        }

        let started = std::time::Instant::now();
        if self.config.json_output {
            JsonMessage::run_start(
                self.registry.len(),
                self.config.target_format,
                self.config.mode,
            )
            .emit();
        } else {
            info!(
                "Starting batch transformation: {} items -> {}",
                self.registry.len(),
                self.config.target_format
            );
        }

        let tracker = ProgressTracker::new(self.registry.len(), self.config.json_output);
        let driver = BatchDriver::new(&self.engine);
        let results = driver
            .run(self.registry.items(), &self.config, &tracker)
            .await?;
        self.results = results;

        let stats = self.stats();
        tracker.finish(&stats.format_summary());

        if self.config.json_output {
            JsonMessage::run_complete(stats.clone(), started.elapsed().as_secs_f64()).emit();
        } else {
            info!("=== Batch Complete ===");
            info!("Items completed: {}", stats.completed);
            info!("Items failed: {}", stats.failed);
            info!(
                "Total size: {} -> {} ({}% smaller)",
                crate::files::FileScanner::format_size(stats.total_original_size),
                crate::files::FileScanner::format_size(stats.total_output_size),
                stats.compression_ratio_percent
            );
        }

        Ok(stats)
    }

    /// Aggregate statistics derived from the current result set
    pub fn stats(&self) -> BatchStats {
        BatchStats::summarize(&self.results)
    }

    /// Package the succeeded subset of the last run into one deliverable
    pub fn package(&self) -> Result<ArchiveOutput, BatchError> {
        ArchiveAssembler::package(&self.results, &self.config)
    }

    /// Read-only serializable view of the session
    pub fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            items: self
                .registry
                .items()
                .iter()
                .map(|item| ItemSummary {
                    id: item.id.clone(),
                    name: item.source_name.clone(),
                    mime: item.mime.clone(),
                    size: item.size(),
                })
                .collect(),
            results: self.results.clone(),
            stats: self.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformMode;
    use crate::engine::TargetFormat;
    use crate::job::JobStatus;
    use image::{DynamicImage, ImageOutputFormat};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbImage::from_fn(8, 8, |x, y| {
            image::Rgb([(x * 29) as u8, (y * 37) as u8, 64])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn convert_config(format: TargetFormat) -> BatchConfig {
        BatchConfig {
            target_format: format,
            mode: TransformMode::Convert,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_run_before_load_is_engine_unavailable() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Png)).unwrap();
        orchestrator.add_files(vec![RawFile::new("a.png", "image/png", tiny_png())]);

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, BatchError::EngineUnavailable));
        assert!(orchestrator.results().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_run_and_package() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Jpg)).unwrap();
        orchestrator.load_engine().await.unwrap();
        assert_eq!(*orchestrator.engine_state(), EngineState::Ready);

        orchestrator.add_files(vec![
            RawFile::new("a.png", "image/png", tiny_png()),
            RawFile::new("b.png", "image/png", tiny_png()),
            RawFile::new("broken.png", "image/png", b"garbage".to_vec()),
        ]);

        let stats = orchestrator.run().await.unwrap();
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.pending, 0);

        let output = orchestrator.package().unwrap();
        assert_eq!(output.file_name, "converted-images-jpg.zip");
        assert!(!output.bytes.is_empty());
    }

    #[tokio::test]
    async fn test_new_selection_invalidates_results() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Png)).unwrap();
        orchestrator.load_engine().await.unwrap();

        orchestrator.add_files(vec![RawFile::new("a.png", "image/png", tiny_png())]);
        orchestrator.run().await.unwrap();
        assert_eq!(orchestrator.results().len(), 1);

        orchestrator.add_files(vec![RawFile::new("b.png", "image/png", tiny_png())]);
        assert!(orchestrator.results().is_empty());
        assert_eq!(orchestrator.items().len(), 2);
    }

    #[tokio::test]
    async fn test_rerun_with_new_format_discards_prior_results() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Png)).unwrap();
        orchestrator.load_engine().await.unwrap();
        orchestrator.add_files(vec![
            RawFile::new("a.png", "image/png", tiny_png()),
            RawFile::new("b.png", "image/png", tiny_png()),
        ]);

        orchestrator.run().await.unwrap();
        assert!(orchestrator
            .results()
            .iter()
            .all(|r| r.output_format == TargetFormat::Png));

        orchestrator
            .set_config(convert_config(TargetFormat::Webp))
            .unwrap();
        orchestrator.run().await.unwrap();

        // No stale entries from the previous run
        assert_eq!(orchestrator.results().len(), 2);
        assert!(orchestrator
            .results()
            .iter()
            .all(|r| r.output_format == TargetFormat::Webp));
    }

    #[tokio::test]
    async fn test_package_without_successes_fails() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Png)).unwrap();
        orchestrator.load_engine().await.unwrap();
        orchestrator.add_files(vec![RawFile::new(
            "broken.png",
            "image/png",
            b"garbage".to_vec(),
        )]);
        orchestrator.run().await.unwrap();

        let err = orchestrator.package().unwrap_err();
        assert!(matches!(err, BatchError::EmptyResultSet));
    }

    #[tokio::test]
    async fn test_remove_excludes_item_from_next_run() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Png)).unwrap();
        orchestrator.load_engine().await.unwrap();
        let ids = orchestrator.add_files(vec![
            RawFile::new("a.png", "image/png", tiny_png()),
            RawFile::new("b.png", "image/png", tiny_png()),
        ]);
        assert_eq!(orchestrator.active_previews(), 2);

        orchestrator.remove(&ids[0]);
        assert_eq!(orchestrator.active_previews(), 1);

        orchestrator.run().await.unwrap();
        assert_eq!(orchestrator.results().len(), 1);
        assert_eq!(orchestrator.results()[0].id, ids[1]);
    }

    #[tokio::test]
    async fn test_snapshot_is_serializable_and_consistent() {
        let mut orchestrator =
            BatchOrchestrator::new(convert_config(TargetFormat::Png)).unwrap();
        orchestrator.load_engine().await.unwrap();
        orchestrator.add_files(vec![RawFile::new("a.png", "image/png", tiny_png())]);
        orchestrator.run().await.unwrap();

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].status, JobStatus::Succeeded);
        assert_eq!(snapshot.stats, orchestrator.stats());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"status\":\"succeeded\""));
    }
}
