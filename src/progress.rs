//! # Progress Bar Module
//!
//! Thin wrapper around `indicatif` for per-item progress feedback.
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:02] [================>-----------------------] 3/7 (42%) [OK] photo.jpg: 45% smaller
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages the batch progress bar
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress bar sized to the batch
    pub fn new(total_items: u64) -> Self {
        let bar = ProgressBar::new(total_items);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by one item with a status message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Set a message without advancing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final summary line
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Spinner for indeterminate work (engine load)
    pub fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();

        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );

        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        spinner
    }
}
