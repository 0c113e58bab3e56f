//! In-memory fakes for the collaborator traits, shared across test modules.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use harvest_media::{MediaError, MediaResult, VideoMetadata};
use harvest_models::{SubtitleAvailability, SubtitleTrack};
use harvest_storage::{StorageError, StorageResult};

use crate::collaborators::{MediaFetcher, MediaResolver, ObjectStore};

/// Records collaborator invocations, one line per call.
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    fn push(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn any_with_prefix(&self, prefix: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.starts_with(prefix))
    }
}

fn record(calls: &Option<Arc<CallLog>>, entry: String) {
    if let Some(calls) = calls {
        calls.push(entry);
    }
}

/// Resolver returning canned metadata and availability.
pub struct StubResolver {
    metadata: Option<VideoMetadata>,
    availability: SubtitleAvailability,
    title_from_reference: bool,
    calls: Option<Arc<CallLog>>,
}

impl StubResolver {
    pub fn with_metadata(title: &str, uploader: &str, availability: SubtitleAvailability) -> Self {
        Self {
            metadata: Some(VideoMetadata {
                title: title.to_string(),
                uploader: uploader.to_string(),
                duration_seconds: 300,
            }),
            availability,
            title_from_reference: false,
            calls: None,
        }
    }

    /// A resolver that gives every reference a distinct title.
    pub fn per_reference(uploader: &str, availability: SubtitleAvailability) -> Self {
        let mut resolver = Self::with_metadata("", uploader, availability);
        resolver.title_from_reference = true;
        resolver
    }

    /// A resolver whose metadata lookup fails.
    pub fn failing() -> Self {
        Self {
            metadata: None,
            availability: SubtitleAvailability::default(),
            title_from_reference: false,
            calls: None,
        }
    }

    pub fn recording(mut self, calls: &Arc<CallLog>) -> Self {
        self.calls = Some(Arc::clone(calls));
        self
    }
}

#[async_trait]
impl MediaResolver for StubResolver {
    async fn resolve_metadata(&self, reference: &str) -> MediaResult<VideoMetadata> {
        record(&self.calls, format!("resolve_metadata:{reference}"));
        let mut metadata = self
            .metadata
            .clone()
            .ok_or_else(|| MediaError::probe_failed("simulated probe failure"))?;
        if self.title_from_reference {
            metadata.title = reference
                .rsplit('/')
                .next()
                .unwrap_or(reference)
                .to_string();
        }
        Ok(metadata)
    }

    async fn resolve_subtitle_availability(
        &self,
        reference: &str,
    ) -> MediaResult<SubtitleAvailability> {
        record(&self.calls, format!("resolve_availability:{reference}"));
        Ok(self.availability.clone())
    }
}

/// Fetcher that writes real files into the scratch directory.
pub struct StubFetcher {
    subtitle_materializes: bool,
    fail_audio: bool,
    calls: Option<Arc<CallLog>>,
}

impl StubFetcher {
    /// Every fetch produces its file.
    pub fn materializing() -> Self {
        Self {
            subtitle_materializes: true,
            fail_audio: false,
            calls: None,
        }
    }

    /// Subtitle fetches succeed but leave no file behind.
    pub fn without_subtitle_file() -> Self {
        Self {
            subtitle_materializes: false,
            fail_audio: false,
            calls: None,
        }
    }

    pub fn failing_audio(mut self) -> Self {
        self.fail_audio = true;
        self
    }

    pub fn recording(mut self, calls: &Arc<CallLog>) -> Self {
        self.calls = Some(Arc::clone(calls));
        self
    }
}

#[async_trait]
impl MediaFetcher for StubFetcher {
    async fn fetch_subtitle(
        &self,
        reference: &str,
        language: &str,
        track: SubtitleTrack,
        dest_dir: &Path,
        stem: &str,
    ) -> MediaResult<Option<PathBuf>> {
        record(
            &self.calls,
            format!("fetch_subtitle:{reference}:{language}:{track}"),
        );
        if !self.subtitle_materializes {
            return Ok(None);
        }
        let path = dest_dir.join(format!("{stem}.{language}.srt"));
        tokio::fs::write(&path, "1\n00:00:00,000 --> 00:00:01,000\nhello\n").await?;
        Ok(Some(path))
    }

    async fn fetch_audio(
        &self,
        reference: &str,
        dest_dir: &Path,
        stem: &str,
    ) -> MediaResult<PathBuf> {
        record(&self.calls, format!("fetch_audio:{reference}"));
        if self.fail_audio {
            return Err(MediaError::fetch_failed("simulated audio failure"));
        }
        let path = dest_dir.join(format!("{stem}.wav"));
        tokio::fs::write(&path, b"RIFF").await?;
        Ok(path)
    }
}

/// Object store keeping keys in a shared set.
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashSet<String>>>,
    fail_uploads: bool,
    calls: Option<Arc<CallLog>>,
}

impl MemoryStore {
    pub fn empty() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashSet::new())),
            fail_uploads: false,
            calls: None,
        }
    }

    pub fn with_objects(keys: &[&str]) -> Self {
        let store = Self::empty();
        {
            let mut objects = store.objects.lock().unwrap();
            for key in keys {
                objects.insert(key.to_string());
            }
        }
        store
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn recording(mut self, calls: &Arc<CallLog>) -> Self {
        self.calls = Some(Arc::clone(calls));
        self
    }

    pub fn objects(&self) -> Arc<Mutex<HashSet<String>>> {
        Arc::clone(&self.objects)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        record(&self.calls, format!("exists:{key}"));
        Ok(self.objects.lock().unwrap().contains(key))
    }

    async fn upload(&self, path: &Path, key: &str) -> StorageResult<String> {
        record(&self.calls, format!("upload:{key}"));
        if self.fail_uploads {
            return Err(StorageError::upload_failed("simulated upload failure"));
        }
        if !path.exists() {
            return Err(StorageError::upload_failed(format!(
                "missing local file {}",
                path.display()
            )));
        }
        self.objects.lock().unwrap().insert(key.to_string());
        Ok(self.locator(key))
    }

    fn locator(&self, key: &str) -> String {
        format!("s3://test-bucket/{key}")
    }
}
