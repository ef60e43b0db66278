//! # Job State Machine Module
//!
//! Per-item transformation status and results. Pure data plus transition
//! rules, no I/O.
//!
//! ## State machine:
//! ```text
//! Queued -> Running -> Succeeded
//!                   -> Failed
//! ```
//! `Succeeded` and `Failed` are terminal; within one run no result ever
//! regresses. Invalid transitions are rejected with a warning log and no
//! mutation - never a panic.
//!
//! ## Result set discipline:
//! `JobBoard::initialize()` creates exactly one `Queued` result per item
//! present at that instant, freezing each item's output format for the
//! duration of the run. A new run builds a fresh board, discarding the
//! previous result set wholesale.

use crate::engine::TargetFormat;
use crate::registry::SelectedItem;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Transformation status for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Outcome record for one item, keyed 1:1 by the item's id
#[derive(Debug, Clone, Serialize)]
pub struct TransformationResult {
    pub id: String,
    pub source_name: String,
    pub status: JobStatus,
    /// Format frozen at the moment the run started
    pub output_format: TargetFormat,
    #[serde(skip)]
    pub output_bytes: Vec<u8>,
    /// Set only when `Failed`
    pub error: Option<String>,
    pub original_size: u64,
    /// Zero until `Succeeded`
    pub output_size: u64,
}

impl TransformationResult {
    /// Per-item size reduction, defined only for succeeded results
    pub fn reduction_percent(&self) -> Option<i64> {
        if self.status != JobStatus::Succeeded {
            return None;
        }
        if self.original_size == 0 {
            return Some(0);
        }
        let ratio = 1.0 - (self.output_size as f64 / self.original_size as f64);
        Some((ratio * 100.0).round() as i64)
    }
}

/// Holds the result set for one run and enforces the transition rules
#[derive(Debug, Default)]
pub struct JobBoard {
    results: Vec<TransformationResult>,
}

impl JobBoard {
    /// One `Queued` result per item, output format frozen at call time
    pub fn initialize(items: &[SelectedItem], target_format: TargetFormat) -> Self {
        let results = items
            .iter()
            .map(|item| TransformationResult {
                id: item.id.clone(),
                source_name: item.source_name.clone(),
                status: JobStatus::Queued,
                output_format: target_format,
                output_bytes: Vec::new(),
                error: None,
                original_size: item.size(),
                output_size: 0,
            })
            .collect();

        Self { results }
    }

    /// `Queued -> Running`; anything else is rejected
    pub fn mark_running(&mut self, id: &str) -> bool {
        self.transition(id, JobStatus::Queued, |result| {
            result.status = JobStatus::Running;
        })
    }

    /// `Running -> Succeeded`; records output bytes and size
    pub fn mark_succeeded(&mut self, id: &str, output_bytes: Vec<u8>) -> bool {
        self.transition(id, JobStatus::Running, |result| {
            result.output_size = output_bytes.len() as u64;
            result.output_bytes = output_bytes;
            result.status = JobStatus::Succeeded;
        })
    }

    /// `Running -> Failed`; records the error message
    pub fn mark_failed(&mut self, id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        self.transition(id, JobStatus::Running, |result| {
            result.error = Some(message);
            result.status = JobStatus::Failed;
        })
    }

    pub fn get(&self, id: &str) -> Option<&TransformationResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn results(&self) -> &[TransformationResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TransformationResult> {
        self.results
    }

    fn transition<F>(&mut self, id: &str, expected: JobStatus, apply: F) -> bool
    where
        F: FnOnce(&mut TransformationResult),
    {
        match self.results.iter_mut().find(|r| r.id == id) {
            Some(result) if result.status == expected => {
                apply(result);
                true
            }
            Some(result) => {
                warn!(
                    "Rejected transition for item {}: expected {:?}, found {:?}",
                    id, expected, result.status
                );
                false
            }
            None => {
                warn!("Transition requested for unknown item id {}", id);
                false
            }
        }
    }
}
