//! Per-item processing state machine.
//!
//! Drives one work item from reference to outcome: resolve metadata and
//! subtitle availability, decide which stages still need to run against the
//! remote store, fetch and upload the missing artifacts, classify the
//! result. No failure escapes [`ItemProcessor::process`]; every path folds
//! into exactly one [`Outcome`].

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use harvest_models::{
    select_language, ArtifactKeys, Outcome, SkipReason, UploadResult, WorkItem,
};

use crate::collaborators::{MediaFetcher, MediaResolver, ObjectStore};
use crate::config::ProcessorConfig;
use crate::error::PipelineResult;

/// Cap on operator-facing error messages.
const MAX_ERROR_CHARS: usize = 200;

/// Processes one work item at a time against the collaborator seams.
pub struct ItemProcessor<R, F, S> {
    resolver: R,
    fetcher: F,
    store: S,
    config: ProcessorConfig,
    scratch_dir: PathBuf,
}

impl<R, F, S> ItemProcessor<R, F, S>
where
    R: MediaResolver,
    F: MediaFetcher,
    S: ObjectStore,
{
    pub fn new(
        resolver: R,
        fetcher: F,
        store: S,
        config: ProcessorConfig,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            store,
            config,
            scratch_dir,
        }
    }

    /// Drive `item` to its terminal outcome.
    ///
    /// Unexpected failures are converted into an error outcome at this
    /// boundary; they never propagate to the worker pool.
    pub async fn process(&self, item: &WorkItem) -> Outcome {
        match self.process_inner(item).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::error(item, None, truncate_message(&e.to_string())),
        }
    }

    async fn process_inner(&self, item: &WorkItem) -> PipelineResult<Outcome> {
        // Stage 1: metadata
        let metadata = match self.resolver.resolve_metadata(&item.reference).await {
            Ok(metadata) => metadata,
            Err(e) => {
                return Ok(Outcome::error(
                    item,
                    None,
                    truncate_message(&format!("resolution failed: {e}")),
                ))
            }
        };

        let keys = ArtifactKeys::derive(&self.config.key_prefix, &metadata.uploader, &metadata.title);
        let owner = keys.owner.clone();

        info!(
            position = %item.position(),
            title = %metadata.title,
            uploader = %metadata.uploader,
            duration = %metadata.duration_display(),
            "Resolved item metadata"
        );

        // Stage 2: subtitle availability, manual tracks first
        let availability = match self
            .resolver
            .resolve_subtitle_availability(&item.reference)
            .await
        {
            Ok(availability) => availability,
            Err(e) => {
                return Ok(Outcome::error(
                    item,
                    Some(owner),
                    truncate_message(&format!("resolution failed: {e}")),
                ))
            }
        };

        let (track, candidates) = match availability.choose_track() {
            Some(selected) => selected,
            None => {
                info!(position = %item.position(), "No subtitle track available, skipping");
                return Ok(Outcome::skipped(
                    item,
                    Some(owner),
                    SkipReason::NoSubtitleAvailable,
                ));
            }
        };

        // Stage 3: language selection. An empty candidate list cannot occur
        // once a track was chosen, but guard it rather than panic.
        let language = match select_language(candidates, &self.config.preferred_languages) {
            Some(language) => language.to_string(),
            None => {
                return Ok(Outcome::error(
                    item,
                    Some(owner),
                    "no candidate subtitle language",
                ))
            }
        };

        // Stage 4+5: existence checks make re-runs idempotent
        let audio_exists = self.store.exists(&keys.audio).await?;
        let subtitle_exists = self.store.exists(&keys.subtitle).await?;

        if audio_exists && subtitle_exists {
            info!(position = %item.position(), title = %metadata.title, "Both artifacts already stored, skipping");
            return Ok(Outcome::skipped(
                item,
                Some(owner),
                SkipReason::ExistsInRemoteStore,
            ));
        }

        // Stage 6: subtitle fetch. Audio is only worth having paired with a
        // subtitle, so a missing subtitle file skips the item entirely.
        let subtitle_local = if subtitle_exists {
            None
        } else {
            match self
                .fetcher
                .fetch_subtitle(&item.reference, &language, track, &self.scratch_dir, &keys.stem)
                .await?
            {
                Some(path) => Some(path),
                None => {
                    info!(position = %item.position(), language = %language, "Subtitle fetch produced no file, skipping");
                    return Ok(Outcome::skipped(
                        item,
                        Some(owner),
                        SkipReason::SubtitleDownloadFailed,
                    ));
                }
            }
        };

        // Stage 7: audio fetch
        let audio_local = if audio_exists {
            None
        } else {
            Some(
                self.fetcher
                    .fetch_audio(&item.reference, &self.scratch_dir, &keys.stem)
                    .await?,
            )
        };

        // Stage 8: uploads, subtitle first; reuse locators for pre-existing
        // keys. Scratch files are deleted as soon as their upload lands.
        let subtitle_locator = match subtitle_local {
            None => Some(self.store.locator(&keys.subtitle)),
            Some(path) => self.upload_and_clean(&path, &keys.subtitle).await,
        };

        let audio_locator = match audio_local {
            None => Some(self.store.locator(&keys.audio)),
            Some(path) => self.upload_and_clean(&path, &keys.audio).await,
        };

        // Stage 9: classify. Success requires both locators.
        let result = UploadResult {
            wav: audio_locator,
            subtitle: subtitle_locator,
            subtitle_type: track,
            subtitle_lang: language,
        };

        if result.is_complete() {
            info!(
                position = %item.position(),
                title = %metadata.title,
                track = %track,
                language = %result.subtitle_lang,
                "Item processed"
            );
            Ok(Outcome::success(item, owner, result))
        } else {
            Ok(Outcome::error(item, Some(owner), "upload_failed"))
        }
    }

    /// Upload one artifact and remove its scratch file on success.
    ///
    /// Upload failures surface as a missing locator (classified by the
    /// caller), not as an aborted item; the scratch file then stays behind
    /// until the run directory is removed.
    async fn upload_and_clean(&self, path: &Path, key: &str) -> Option<String> {
        match self.store.upload(path, key).await {
            Ok(locator) => {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    warn!(path = %path.display(), "Failed to remove scratch file: {}", e);
                }
                Some(locator)
            }
            Err(e) => {
                warn!(key = key, "Upload failed: {}", e);
                None
            }
        }
    }
}

/// Truncate an error message on a character boundary.
fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_CHARS {
        message.to_string()
    } else {
        message.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;

    use harvest_models::{OutcomeStatus, SubtitleAvailability, SubtitleTrack};

    use crate::test_support::{CallLog, MemoryStore, StubFetcher, StubResolver};

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn item() -> WorkItem {
        WorkItem {
            reference: "https://youtu.be/abc123def45".to_string(),
            sequence_index: 1,
            total: 1,
        }
    }

    fn config() -> ProcessorConfig {
        ProcessorConfig {
            key_prefix: "corpus".to_string(),
            preferred_languages: langs(&["tr", "en"]),
        }
    }

    struct Fixture {
        scratch: TempDir,
        calls: Arc<CallLog>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scratch: TempDir::new().unwrap(),
                calls: Arc::new(CallLog::default()),
            }
        }

        fn processor(
            &self,
            resolver: StubResolver,
            fetcher: StubFetcher,
            store: MemoryStore,
        ) -> ItemProcessor<StubResolver, StubFetcher, MemoryStore> {
            ItemProcessor::new(
                resolver,
                fetcher,
                store,
                config(),
                self.scratch.path().to_path_buf(),
            )
        }

        fn resolver(&self, availability: SubtitleAvailability) -> StubResolver {
            StubResolver::with_metadata("Pilot Episode", "Some Channel", availability)
                .recording(&self.calls)
        }
    }

    #[tokio::test]
    async fn no_subtitles_skips_without_fetch_or_upload() {
        let fx = Fixture::new();
        let processor = fx.processor(
            fx.resolver(SubtitleAvailability::default()),
            StubFetcher::materializing().recording(&fx.calls),
            MemoryStore::empty().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        assert_eq!(
            outcome.status,
            OutcomeStatus::Skipped(SkipReason::NoSubtitleAvailable)
        );
        assert!(!fx.calls.any_with_prefix("fetch_"));
        assert!(!fx.calls.any_with_prefix("upload:"));
        assert!(!fx.calls.any_with_prefix("exists:"));
    }

    #[tokio::test]
    async fn both_artifacts_present_skips_without_fetch() {
        let fx = Fixture::new();
        let store = MemoryStore::with_objects(&[
            "corpus/Some Channel/Pilot Episode.wav",
            "corpus/Some Channel/Pilot Episode.srt",
        ])
        .recording(&fx.calls);

        let availability = SubtitleAvailability {
            has_manual: true,
            manual_languages: langs(&["en"]),
            ..Default::default()
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().recording(&fx.calls),
            store,
        );

        let outcome = processor.process(&item()).await;

        assert_eq!(
            outcome.status,
            OutcomeStatus::Skipped(SkipReason::ExistsInRemoteStore)
        );
        assert!(!fx.calls.any_with_prefix("fetch_"));
        assert!(!fx.calls.any_with_prefix("upload:"));
    }

    #[tokio::test]
    async fn manual_track_preferred_over_auto() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_manual: true,
            has_auto: true,
            manual_languages: langs(&["de"]),
            auto_languages: langs(&["tr", "en"]),
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().recording(&fx.calls),
            MemoryStore::empty().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        match outcome.status {
            OutcomeStatus::Success(result) => {
                assert_eq!(result.subtitle_type, SubtitleTrack::Manual);
                assert_eq!(result.subtitle_lang, "de");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn preferred_language_order_applies_to_auto_tracks() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_auto: true,
            auto_languages: langs(&["es", "en"]),
            ..Default::default()
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().recording(&fx.calls),
            MemoryStore::empty().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        match outcome.status {
            OutcomeStatus::Success(result) => {
                assert_eq!(result.subtitle_type, SubtitleTrack::Auto);
                assert_eq!(result.subtitle_lang, "en");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_subtitle_file_skips_before_audio_fetch() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_manual: true,
            manual_languages: langs(&["en"]),
            ..Default::default()
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::without_subtitle_file().recording(&fx.calls),
            MemoryStore::empty().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        assert_eq!(
            outcome.status,
            OutcomeStatus::Skipped(SkipReason::SubtitleDownloadFailed)
        );
        assert!(fx.calls.any_with_prefix("fetch_subtitle"));
        assert!(!fx.calls.any_with_prefix("fetch_audio"));
        assert!(!fx.calls.any_with_prefix("upload:"));
    }

    #[tokio::test]
    async fn fresh_item_uploads_both_and_cleans_scratch() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_manual: true,
            manual_languages: langs(&["tr"]),
            ..Default::default()
        };
        let store = MemoryStore::empty().recording(&fx.calls);
        let objects = store.objects();
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().recording(&fx.calls),
            store,
        );

        let outcome = processor.process(&item()).await;

        match outcome.status {
            OutcomeStatus::Success(result) => {
                assert_eq!(
                    result.wav.as_deref(),
                    Some("s3://test-bucket/corpus/Some Channel/Pilot Episode.wav")
                );
                assert_eq!(
                    result.subtitle.as_deref(),
                    Some("s3://test-bucket/corpus/Some Channel/Pilot Episode.srt")
                );
            }
            other => panic!("expected success, got {:?}", other),
        }

        assert_eq!(outcome.owner.as_deref(), Some("Some Channel"));
        assert_eq!(objects.lock().unwrap().len(), 2);

        // Scratch files were removed after their uploads landed
        let leftover = std::fs::read_dir(fx.scratch.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_manual: true,
            manual_languages: langs(&["en"]),
            ..Default::default()
        };

        let store = MemoryStore::empty();
        let first = fx.processor(
            fx.resolver(availability.clone()),
            StubFetcher::materializing(),
            store.clone(),
        );
        let first_outcome = first.process(&item()).await;
        assert!(matches!(first_outcome.status, OutcomeStatus::Success(_)));

        // Re-run with the store state carried over; only existence checks run
        let second_calls = Arc::new(CallLog::default());
        let second = fx.processor(
            fx.resolver(availability).recording(&second_calls),
            StubFetcher::materializing().recording(&second_calls),
            store.recording(&second_calls),
        );
        let second_outcome = second.process(&item()).await;

        assert_eq!(
            second_outcome.status,
            OutcomeStatus::Skipped(SkipReason::ExistsInRemoteStore)
        );
        assert!(!second_calls.any_with_prefix("fetch_"));
        assert!(!second_calls.any_with_prefix("upload:"));
    }

    #[tokio::test]
    async fn partial_artifact_reuses_existing_locator() {
        let fx = Fixture::new();
        // Subtitle already stored, audio missing: only audio is fetched
        let store =
            MemoryStore::with_objects(&["corpus/Some Channel/Pilot Episode.srt"]).recording(&fx.calls);
        let availability = SubtitleAvailability {
            has_manual: true,
            manual_languages: langs(&["en"]),
            ..Default::default()
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().recording(&fx.calls),
            store,
        );

        let outcome = processor.process(&item()).await;

        match outcome.status {
            OutcomeStatus::Success(result) => {
                assert_eq!(
                    result.subtitle.as_deref(),
                    Some("s3://test-bucket/corpus/Some Channel/Pilot Episode.srt")
                );
                assert!(result.wav.is_some());
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert!(!fx.calls.any_with_prefix("fetch_subtitle"));
        assert!(fx.calls.any_with_prefix("fetch_audio"));
    }

    #[tokio::test]
    async fn resolution_failure_is_an_error_outcome() {
        let fx = Fixture::new();
        let processor = fx.processor(
            StubResolver::failing(),
            StubFetcher::materializing().recording(&fx.calls),
            MemoryStore::empty().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        match outcome.status {
            OutcomeStatus::Error(message) => {
                assert!(message.starts_with("resolution failed:"), "{}", message)
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert!(outcome.owner.is_none());
        assert!(!fx.calls.any_with_prefix("fetch_"));
    }

    #[tokio::test]
    async fn upload_failure_classifies_as_upload_failed() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_manual: true,
            manual_languages: langs(&["en"]),
            ..Default::default()
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().recording(&fx.calls),
            MemoryStore::empty().failing_uploads().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        assert_eq!(
            outcome.status,
            OutcomeStatus::Error("upload_failed".to_string())
        );
    }

    #[tokio::test]
    async fn audio_fetch_error_hits_the_item_boundary() {
        let fx = Fixture::new();
        let availability = SubtitleAvailability {
            has_auto: true,
            auto_languages: langs(&["en"]),
            ..Default::default()
        };
        let processor = fx.processor(
            fx.resolver(availability),
            StubFetcher::materializing().failing_audio().recording(&fx.calls),
            MemoryStore::empty().recording(&fx.calls),
        );

        let outcome = processor.process(&item()).await;

        assert!(matches!(outcome.status, OutcomeStatus::Error(_)));
        // The failure stayed contained; nothing was uploaded
        assert!(!fx.calls.any_with_prefix("upload:"));
    }

    #[test]
    fn test_truncate_message() {
        let short = "brief failure";
        assert_eq!(truncate_message(short), short);

        let long = "x".repeat(1000);
        assert_eq!(truncate_message(&long).chars().count(), MAX_ERROR_CHARS);
    }
}
