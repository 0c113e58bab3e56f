//! yt-dlp adapter for the audioharvest pipeline.
//!
//! This crate wraps the yt-dlp CLI for:
//! - Metadata probing (title, uploader, duration)
//! - Subtitle availability probing (manual vs. automatic tracks)
//! - Subtitle fetch (converted to SRT)
//! - Audio fetch (extracted to WAV)
//!
//! All entry points shell out via `tokio::process` and never block the
//! runtime; callers own the destination directory lifecycle.

pub mod error;
pub mod fetch;
pub mod probe;

pub use error::{MediaError, MediaResult};
pub use fetch::{fetch_audio, fetch_subtitle, find_subtitle_file, FetchObserver};
pub use probe::{
    availability_from_probe, metadata_from_probe, resolve_metadata, resolve_subtitle_availability,
    VideoMetadata,
};
