//! # Batch Image Converter Library
//!
//! Library crate exposing the batch transformation pipeline.
//!
//! ## Responsibilities:
//! - Defines the modular structure of the application
//! - Re-exports the main types for the CLI and other consumers
//!
//! ## Module architecture:
//! - `config`: run parameters and validation
//! - `error`: batch-level and engine error types
//! - `engine`: in-process codec engine with an explicit load lifecycle
//! - `registry`: selected items and scoped preview handles
//! - `job`: per-item state machine and result records
//! - `stats`: on-demand batch aggregation
//! - `archive`: deliverable packaging (single file or ZIP)
//! - `files`: input discovery and file utilities
//! - `events`: JSON event stream for programmatic consumers
//! - `progress`: progress bar plumbing
//! - `orchestrator`: facade, sequential driver and progress tracking
//!
//! ## Usage:
//! ```rust,no_run
//! use batch_image_converter::{BatchConfig, BatchOrchestrator, RawFile};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut session = BatchOrchestrator::new(BatchConfig::default())?;
//! session.load_engine().await?;
//! session.add_files(vec![RawFile::new("photo.jpg", "image/jpeg", std::fs::read("photo.jpg")?)]);
//! session.run().await?;
//! let deliverable = session.package()?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod files;
pub mod job;
pub mod orchestrator;
pub mod progress;
pub mod registry;
pub mod stats;

pub use archive::{ArchiveAssembler, ArchiveOutput};
pub use config::{BatchConfig, TransformMode};
pub use engine::{CodecEngine, EngineState, TargetFormat};
pub use error::{BatchError, EngineError};
pub use job::{JobBoard, JobStatus, TransformationResult};
pub use orchestrator::{BatchOrchestrator, BatchSnapshot};
pub use registry::{ItemRegistry, RawFile, SelectedItem};
pub use stats::BatchStats;
