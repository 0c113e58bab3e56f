//! Subtitle availability and track/language selection policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of subtitle track was selected for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleTrack {
    /// Uploader-provided subtitles.
    Manual,
    /// Automatically generated captions.
    Auto,
}

impl SubtitleTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleTrack::Manual => "manual",
            SubtitleTrack::Auto => "auto",
        }
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtitle tracks available for an item, derived once from the media probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleAvailability {
    pub has_manual: bool,
    pub has_auto: bool,
    /// Language codes of uploader-provided tracks, in probe order.
    pub manual_languages: Vec<String>,
    /// Language codes of automatic tracks, in probe order.
    pub auto_languages: Vec<String>,
}

impl SubtitleAvailability {
    /// Apply the track priority policy: manual tracks always win over
    /// automatic ones, regardless of language. Returns the selected track
    /// kind and its candidate language list, or `None` when the item has no
    /// subtitles at all.
    pub fn choose_track(&self) -> Option<(SubtitleTrack, &[String])> {
        if self.has_manual {
            Some((SubtitleTrack::Manual, &self.manual_languages))
        } else if self.has_auto {
            Some((SubtitleTrack::Auto, &self.auto_languages))
        } else {
            None
        }
    }
}

/// Pick a subtitle language from `candidates`.
///
/// Preferred codes are tried in order; the first one present in the candidate
/// list wins. When none match, the first available language is used. Returns
/// `None` only for an empty candidate list.
pub fn select_language<'a>(candidates: &'a [String], preferred: &[String]) -> Option<&'a str> {
    for code in preferred {
        if let Some(found) = candidates.iter().find(|c| *c == code) {
            return Some(found.as_str());
        }
    }
    candidates.first().map(String::as_str)
}
