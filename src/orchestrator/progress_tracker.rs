//! # Progress Tracking Module
//!
//! Unified per-run progress: drives the `indicatif` bar and, in JSON mode,
//! emits `item_start` / `item_complete` / `progress` events after every
//! item.

use crate::{
    events::JsonMessage,
    job::{JobStatus, TransformationResult},
    progress::ProgressManager,
    registry::SelectedItem,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-run progress tracker shared between driver and facade
#[derive(Clone)]
pub struct ProgressTracker {
    pub total_items: usize,
    json_output: bool,
    current: Arc<Mutex<usize>>,
    completed: Arc<Mutex<usize>>,
    failed: Arc<Mutex<usize>>,
    bar: ProgressManager,
}

impl ProgressTracker {
    pub fn new(total_items: usize, json_output: bool) -> Self {
        Self {
            total_items,
            json_output,
            current: Arc::new(Mutex::new(0)),
            completed: Arc::new(Mutex::new(0)),
            failed: Arc::new(Mutex::new(0)),
            bar: ProgressManager::new(total_items as u64),
        }
    }

    /// An item entered the engine
    pub async fn item_started(&self, index: usize, item: &SelectedItem) {
        if self.json_output {
            JsonMessage::item_start(
                item.id.clone(),
                item.source_name.clone(),
                item.size(),
                index,
                self.total_items,
            )
            .emit();
        }
        self.bar
            .set_message(&format!("Transforming {}", item.source_name));
    }

    /// An item reached a terminal state
    pub async fn item_finished(&self, result: &TransformationResult) {
        {
            let mut current = self.current.lock().await;
            *current += 1;
        }

        let message = match result.status {
            JobStatus::Succeeded => {
                let mut completed = self.completed.lock().await;
                *completed += 1;
                format!(
                    "[OK] {}: {}% smaller",
                    result.source_name,
                    result.reduction_percent().unwrap_or(0)
                )
            }
            JobStatus::Failed => {
                let mut failed = self.failed.lock().await;
                *failed += 1;
                format!(
                    "[FAILED] {}: {}",
                    result.source_name,
                    result.error.as_deref().unwrap_or("unknown error")
                )
            }
            // Non-terminal statuses never reach this path
            _ => format!("[..] {}", result.source_name),
        };

        if self.json_output {
            JsonMessage::item_complete(result).emit();
            self.emit_progress().await;
        }

        self.bar.update(&message);
    }

    /// Finalize the bar with a summary line
    pub fn finish(&self, summary: &str) {
        self.bar.finish(summary);
    }

    async fn emit_progress(&self) {
        let current = *self.current.lock().await;
        let completed = *self.completed.lock().await;
        let failed = *self.failed.lock().await;
        JsonMessage::progress(current, self.total_items, completed, failed).emit();
    }
}
