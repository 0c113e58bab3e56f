//! Bounded-concurrency audio/subtitle harvesting pipeline.
//!
//! Ties the other crates together: fetches a batch of references from the
//! coordination API, drives each item through the per-item state machine
//! under a fixed-size worker pool, records every outcome in the shared
//! progress tracker and the CSV run log, and reports the aggregate status
//! back when the run ends.

pub mod collaborators;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod processor;
pub mod progress;
pub mod runlog;

#[cfg(test)]
pub mod test_support;

pub use collaborators::{MediaFetcher, MediaResolver, ObjectStore, S3Store, YtDlp};
pub use config::{PipelineConfig, ProcessorConfig};
pub use coordinator::PipelineCoordinator;
pub use error::{PipelineError, PipelineResult};
pub use processor::ItemProcessor;
pub use progress::{ProgressState, ProgressTracker, RunSummary};
pub use runlog::RunLog;
