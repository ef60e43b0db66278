//! # Error Types Module
//!
//! Custom error types for the batch transformation pipeline.
//!
//! ## Responsibilities:
//! - Defines `BatchError` for batch-level preconditions and collaborator failures
//! - Defines `EngineError` for per-item codec invocation failures
//! - Integrates with `thiserror` for automatic error conversion
//!
//! ## Propagation policy:
//! - `EngineError` values are absorbed per item by the driver and recorded
//!   on that item's result; they never abort a running batch
//! - `BatchError` values are surfaced to the caller before any state
//!   mutation (engine not loaded, nothing to package, invalid input)

use crate::engine::TargetFormat;

/// Batch-level errors surfaced to the caller
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("codec engine is not loaded")]
    EngineUnavailable,

    #[error("no successfully transformed items to package")]
    EmptyResultSet,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Per-item codec engine errors, recorded on the failing item's result
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("codec engine is not ready")]
    Unavailable,

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("compression is only supported for jpg, png and webp targets (got {0})")]
    UnsupportedCompression(TargetFormat),

    #[error("resizing is not supported for {0} targets")]
    UnsupportedResize(TargetFormat),
}
