//! Terminal classification of a work item.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::item::WorkItem;
use crate::subtitle::SubtitleTrack;

/// Remote locators produced (or reused) for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Locator of the WAV artifact, when available.
    pub wav: Option<String>,
    /// Locator of the SRT artifact, when available.
    pub subtitle: Option<String>,
    /// Which kind of track was selected.
    pub subtitle_type: SubtitleTrack,
    /// Selected subtitle language code.
    pub subtitle_lang: String,
}

impl UploadResult {
    /// Both artifacts have a remote locator.
    pub fn is_complete(&self) -> bool {
        self.wav.is_some() && self.subtitle.is_some()
    }
}

/// Why an item was skipped rather than processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Neither manual nor automatic subtitles exist.
    NoSubtitleAvailable,
    /// Both output keys already exist in the remote store.
    ExistsInRemoteStore,
    /// The subtitle fetch produced no local file.
    SubtitleDownloadFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoSubtitleAvailable => "no_subtitle_available",
            SkipReason::ExistsInRemoteStore => "exists_in_remote_store",
            SkipReason::SubtitleDownloadFailed => "subtitle_download_failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an item's processing ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Both artifacts reached the remote store.
    Success(UploadResult),
    /// Policy skip; no error occurred.
    Skipped(SkipReason),
    /// Processing failed; the message is operator-facing.
    Error(String),
}

/// The single terminal result for one work item.
///
/// Exactly one outcome is produced per item; it is recorded once by the
/// progress tracker and once by the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Reference of the originating work item.
    pub reference: String,
    /// Sanitized owner name, when metadata resolution got that far.
    pub owner: Option<String>,
    pub status: OutcomeStatus,
}

impl Outcome {
    pub fn success(item: &WorkItem, owner: impl Into<String>, result: UploadResult) -> Self {
        Self {
            reference: item.reference.clone(),
            owner: Some(owner.into()),
            status: OutcomeStatus::Success(result),
        }
    }

    pub fn skipped(item: &WorkItem, owner: Option<String>, reason: SkipReason) -> Self {
        Self {
            reference: item.reference.clone(),
            owner,
            status: OutcomeStatus::Skipped(reason),
        }
    }

    pub fn error(item: &WorkItem, owner: Option<String>, message: impl Into<String>) -> Self {
        Self {
            reference: item.reference.clone(),
            owner,
            status: OutcomeStatus::Error(message.into()),
        }
    }

    /// Short status label for the run log.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            OutcomeStatus::Success(_) => "success",
            OutcomeStatus::Skipped(_) => "skipped",
            OutcomeStatus::Error(_) => "error",
        }
    }

    /// Free-form message column for the run log.
    pub fn log_message(&self) -> String {
        match &self.status {
            OutcomeStatus::Success(result) => {
                serde_json::to_string(result).unwrap_or_else(|_| "success".to_string())
            }
            OutcomeStatus::Skipped(reason) => reason.as_str().to_string(),
            OutcomeStatus::Error(message) => message.clone(),
        }
    }
}
