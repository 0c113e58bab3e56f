//! Coordination API client.
//!
//! Fetches the batch of video references to process and reports the
//! aggregate run status back when the pipeline finishes.

pub mod client;
pub mod error;
pub mod types;

pub use client::{SourceClient, SourceConfig};
pub use error::{SourceError, SourceResult};
pub use types::{Batch, BatchItem, CompletionStatus};
