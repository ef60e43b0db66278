//! # Batch Statistics Module
//!
//! Aggregates batch-level statistics from a result-set snapshot. Stats are
//! always computed on demand from the results, never stored alongside them,
//! so the reported numbers cannot drift from the actual state.
//!
//! ## Aggregates:
//! - **completed / failed / pending**: counts by status
//! - **total_original_size**: sum over all results, whatever their outcome
//! - **total_output_size**: sum over succeeded results only
//! - **compression_ratio_percent**: `round((1 - out/orig) * 100)` when both
//!   sums are nonzero, otherwise 0 (display-safety policy, never a
//!   division by zero)

use crate::files::FileScanner;
use crate::job::{JobStatus, TransformationResult};
use serde::{Deserialize, Serialize};

/// Batch-level statistics computed from a result-set snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    pub total_original_size: u64,
    pub total_output_size: u64,
    pub compression_ratio_percent: i64,
}

impl BatchStats {
    /// Summarize a result set
    pub fn summarize(results: &[TransformationResult]) -> Self {
        let mut stats = Self::default();

        for result in results {
            stats.total_original_size += result.original_size;
            match result.status {
                JobStatus::Succeeded => {
                    stats.completed += 1;
                    stats.total_output_size += result.output_size;
                }
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Queued | JobStatus::Running => stats.pending += 1,
            }
        }

        if stats.total_original_size > 0 && stats.total_output_size > 0 {
            let ratio =
                1.0 - (stats.total_output_size as f64 / stats.total_original_size as f64);
            stats.compression_ratio_percent = (ratio * 100.0).round() as i64;
        }

        stats
    }

    /// One-line human summary for the progress bar / final report
    pub fn format_summary(&self) -> String {
        format!(
            "Completed: {} | Failed: {} | Pending: {} | {} -> {} ({}% smaller)",
            self.completed,
            self.failed,
            self.pending,
            FileScanner::format_size(self.total_original_size),
            FileScanner::format_size(self.total_output_size),
            self.compression_ratio_percent
        )
    }
}
