//! Narrow interfaces over the external collaborators.
//!
//! The item processor talks to the media host and the object store only
//! through these traits; production adapters wrap the yt-dlp and S3 crates,
//! tests substitute in-memory fakes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use harvest_media::{FetchObserver, MediaResult, VideoMetadata};
use harvest_models::{SubtitleAvailability, SubtitleTrack};
use harvest_storage::{S3Client, StorageResult};

/// Metadata and subtitle-availability lookups.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve_metadata(&self, reference: &str) -> MediaResult<VideoMetadata>;

    async fn resolve_subtitle_availability(
        &self,
        reference: &str,
    ) -> MediaResult<SubtitleAvailability>;
}

/// Stage-scoped artifact fetches into a scratch directory.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the subtitle track; `None` when no file materialized.
    async fn fetch_subtitle(
        &self,
        reference: &str,
        language: &str,
        track: SubtitleTrack,
        dest_dir: &Path,
        stem: &str,
    ) -> MediaResult<Option<PathBuf>>;

    /// Fetch the audio track as WAV.
    async fn fetch_audio(
        &self,
        reference: &str,
        dest_dir: &Path,
        stem: &str,
    ) -> MediaResult<PathBuf>;
}

/// Existence checks and uploads against the remote object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Upload a local file, returning its remote locator.
    async fn upload(&self, path: &Path, key: &str) -> StorageResult<String>;

    /// Locator an existing key resolves to, without touching the store.
    fn locator(&self, key: &str) -> String;
}

/// Fetch observer that reports lifecycle events through tracing.
pub struct LogObserver;

impl FetchObserver for LogObserver {
    fn on_fetch_started(&self, reference: &str) {
        debug!(reference = reference, "Audio fetch started");
    }

    fn on_fetch_finished(&self, reference: &str, path: &Path, bytes: u64) {
        debug!(
            reference = reference,
            output = %path.display(),
            size_mb = bytes as f64 / (1024.0 * 1024.0),
            "Audio fetch finished"
        );
    }
}

/// Production resolver/fetcher backed by the yt-dlp adapter.
#[derive(Clone)]
pub struct YtDlp {
    observer: Arc<dyn FetchObserver>,
}

impl YtDlp {
    pub fn new() -> Self {
        Self {
            observer: Arc::new(LogObserver),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaResolver for YtDlp {
    async fn resolve_metadata(&self, reference: &str) -> MediaResult<VideoMetadata> {
        harvest_media::resolve_metadata(reference).await
    }

    async fn resolve_subtitle_availability(
        &self,
        reference: &str,
    ) -> MediaResult<SubtitleAvailability> {
        harvest_media::resolve_subtitle_availability(reference).await
    }
}

#[async_trait]
impl MediaFetcher for YtDlp {
    async fn fetch_subtitle(
        &self,
        reference: &str,
        language: &str,
        track: SubtitleTrack,
        dest_dir: &Path,
        stem: &str,
    ) -> MediaResult<Option<PathBuf>> {
        harvest_media::fetch_subtitle(reference, language, track, dest_dir, stem).await
    }

    async fn fetch_audio(
        &self,
        reference: &str,
        dest_dir: &Path,
        stem: &str,
    ) -> MediaResult<PathBuf> {
        harvest_media::fetch_audio(reference, dest_dir, stem, self.observer.as_ref()).await
    }
}

/// Production object store backed by the S3 client.
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

/// Content type for an artifact key, by extension.
fn content_type_for(key: &str) -> &'static str {
    if key.ends_with(".wav") {
        "audio/wav"
    } else if key.ends_with(".srt") {
        "application/x-subrip"
    } else {
        "application/octet-stream"
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.client.exists(key).await
    }

    async fn upload(&self, path: &Path, key: &str) -> StorageResult<String> {
        self.client.upload_file(path, key, content_type_for(key)).await
    }

    fn locator(&self, key: &str) -> String {
        self.client.locator(key)
    }
}
