//! # JSON Event Stream Module
//!
//! Structured JSON output for programmatic consumers (a frontend or
//! wrapper process reading stdout line by line).
//!
//! ## Message types:
//! - `run_start`: a batch run began (item count, format, mode)
//! - `item_start`: one item entered the engine
//! - `item_complete`: one item reached a terminal state
//! - `progress`: running counters after each item
//! - `run_complete`: final aggregate statistics
//! - `error`: batch-level failure

use crate::config::TransformMode;
use crate::engine::TargetFormat;
use crate::job::{JobStatus, TransformationResult};
use crate::stats::BatchStats;
use serde::{Deserialize, Serialize};

/// One line of the JSON event stream
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    RunStart {
        total_items: usize,
        target_format: TargetFormat,
        #[serde(flatten)]
        mode: TransformMode,
    },

    ItemStart {
        id: String,
        name: String,
        size: u64,
        index: usize,
        total: usize,
    },

    ItemComplete {
        id: String,
        name: String,
        status: JobStatus,
        output_size: u64,
        reduction_percent: Option<i64>,
        error: Option<String>,
    },

    Progress {
        current: usize,
        total: usize,
        percentage: f64,
        completed: usize,
        failed: usize,
    },

    RunComplete {
        stats: BatchStats,
        duration_seconds: f64,
    },

    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emit the message as one JSON line on stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn run_start(total_items: usize, target_format: TargetFormat, mode: TransformMode) -> Self {
        Self::RunStart {
            total_items,
            target_format,
            mode,
        }
    }

    pub fn item_start(id: String, name: String, size: u64, index: usize, total: usize) -> Self {
        Self::ItemStart {
            id,
            name,
            size,
            index,
            total,
        }
    }

    pub fn item_complete(result: &TransformationResult) -> Self {
        Self::ItemComplete {
            id: result.id.clone(),
            name: result.source_name.clone(),
            status: result.status,
            output_size: result.output_size,
            reduction_percent: result.reduction_percent(),
            error: result.error.clone(),
        }
    }

    pub fn progress(current: usize, total: usize, completed: usize, failed: usize) -> Self {
        let percentage = if total > 0 {
            (current as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self::Progress {
            current,
            total,
            percentage,
            completed,
            failed,
        }
    }

    pub fn run_complete(stats: BatchStats, duration_seconds: f64) -> Self {
        Self::RunComplete {
            stats,
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}
