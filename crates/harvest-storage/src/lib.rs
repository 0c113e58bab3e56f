//! S3 object store client for harvested artifacts.
//!
//! Exposes the two operations the pipeline core needs, existence checks and
//! file uploads that yield an `s3://` locator, behind an explicit config
//! struct.

pub mod client;
pub mod error;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
