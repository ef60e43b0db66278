//! # Configuration Management Module
//!
//! Run parameters for a batch, with validation and JSON persistence.
//!
//! ## Responsibilities:
//! - Defines `BatchConfig` with every knob a batch run needs
//! - Defines `TransformMode` (convert / compress / resize)
//! - Validates parameter ranges and mode/format compatibility
//! - Supports loading/saving configuration from/to JSON files
//!
//! ## Parameters:
//! - `target_format`: output format requested for every item in the batch
//! - `mode`: plain conversion, quality-aware compression, or percentage resize
//! - `output_path`: where the deliverable is written (None = suggested name in cwd)
//! - `json_output`: emit machine-readable events instead of human logs
//!
//! ## Validation:
//! - Compression quality must be 1-100 and the target must support it
//! - Resize scale must be 1-100 and the target must support it

use crate::engine::TargetFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the engine does with each item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransformMode {
    /// Reformat only
    Convert,
    /// Reformat and recompress at the given quality (1-100)
    Compress { quality: u8 },
    /// Downscale to the given percentage (1-100) of the original dimensions
    Resize { scale: u8 },
}

/// Configuration for one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Output format for every item
    pub target_format: TargetFormat,
    /// Transformation mode
    #[serde(flatten)]
    pub mode: TransformMode,
    /// Where to write the deliverable (None = suggested name in cwd)
    pub output_path: Option<PathBuf>,
    /// Emit progress and results as JSON on stdout
    pub json_output: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            target_format: TargetFormat::Png,
            mode: TransformMode::Convert,
            output_path: None,
            json_output: false,
        }
    }
}

impl BatchConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            TransformMode::Convert => {}
            TransformMode::Compress { quality } => {
                if quality == 0 || quality > 100 {
                    return Err(anyhow::anyhow!("Quality must be between 1 and 100"));
                }
                if !self.target_format.supports_compression() {
                    return Err(anyhow::anyhow!(
                        "Compression is only supported for jpg, png and webp targets (got {})",
                        self.target_format
                    ));
                }
            }
            TransformMode::Resize { scale } => {
                if scale == 0 || scale > 100 {
                    return Err(anyhow::anyhow!("Resize scale must be between 1 and 100"));
                }
                if !self.target_format.supports_resize() {
                    return Err(anyhow::anyhow!(
                        "Resizing cannot emit {} output",
                        self.target_format
                    ));
                }
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: BatchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
