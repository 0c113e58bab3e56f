//! Shared data models for the audioharvest pipeline.
//!
//! This crate provides the types passed between the batch source, the media
//! adapters and the pipeline core:
//! - Work items and batch-line reference extraction
//! - Subtitle availability and the track/language selection policy
//! - Deterministic object-store key derivation
//! - Per-item outcomes and upload results

pub mod item;
pub mod keys;
pub mod outcome;
pub mod subtitle;

// Re-export common types
pub use item::{extract_reference, WorkItem};
pub use keys::{sanitize_component, ArtifactKeys, MAX_OWNER_CHARS, MAX_TITLE_CHARS};
pub use outcome::{Outcome, OutcomeStatus, SkipReason, UploadResult};
pub use subtitle::{select_language, SubtitleAvailability, SubtitleTrack};
