//! # Orchestrator Module
//!
//! Splits batch orchestration into focused submodules:
//! - `batch_orchestrator`: facade owning registry, engine, config and the
//!   last run's result set
//! - `driver`: the sequential per-run transformation loop
//! - `progress_tracker`: unified progress (bar + JSON events)

pub mod batch_orchestrator;
pub mod driver;
pub mod progress_tracker;

pub use batch_orchestrator::{BatchOrchestrator, BatchSnapshot, ItemSummary};
pub use driver::BatchDriver;
pub use progress_tracker::ProgressTracker;
