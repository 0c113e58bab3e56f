//! Media metadata and subtitle availability probing via yt-dlp.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use harvest_models::SubtitleAvailability;

use crate::error::{MediaError, MediaResult};

/// Basic metadata for one media reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub uploader: String,
    pub duration_seconds: u64,
}

impl VideoMetadata {
    /// Duration as `M:SS`, or `N/A` when unknown.
    pub fn duration_display(&self) -> String {
        if self.duration_seconds == 0 {
            "N/A".to_string()
        } else {
            format!(
                "{}:{:02}",
                self.duration_seconds / 60,
                self.duration_seconds % 60
            )
        }
    }
}

/// Run yt-dlp in probe mode and return the parsed info JSON.
async fn probe_json(reference: &str) -> MediaResult<serde_json::Value> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    let output = Command::new("yt-dlp")
        .args([
            "--dump-single-json",
            "--skip-download",
            "--no-playlist",
            "--no-warnings",
            reference,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp probe stderr: {}", stderr);
        return Err(MediaError::probe_failed(
            stderr.lines().last().unwrap_or("Unknown error").to_string(),
        ));
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Extract title/uploader/duration from probe JSON.
///
/// Missing fields fall back to placeholders rather than failing; only a
/// failed probe is an error.
pub fn metadata_from_probe(info: &serde_json::Value) -> VideoMetadata {
    VideoMetadata {
        title: info
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        uploader: info
            .get("uploader")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        duration_seconds: info.get("duration").and_then(|v| v.as_u64()).unwrap_or(0),
    }
}

/// Extract subtitle availability from probe JSON.
///
/// Manual tracks come from `subtitles`, automatic ones from
/// `automatic_captions`; language order follows the probe output.
pub fn availability_from_probe(info: &serde_json::Value) -> SubtitleAvailability {
    let languages = |field: &str| -> Vec<String> {
        info.get(field)
            .and_then(|v| v.as_object())
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    };

    let manual_languages = languages("subtitles");
    let auto_languages = languages("automatic_captions");

    SubtitleAvailability {
        has_manual: !manual_languages.is_empty(),
        has_auto: !auto_languages.is_empty(),
        manual_languages,
        auto_languages,
    }
}

/// Resolve title, uploader and duration for a media reference.
pub async fn resolve_metadata(reference: &str) -> MediaResult<VideoMetadata> {
    let info = probe_json(reference).await?;
    Ok(metadata_from_probe(&info))
}

/// Resolve which subtitle tracks exist for a media reference.
pub async fn resolve_subtitle_availability(reference: &str) -> MediaResult<SubtitleAvailability> {
    let info = probe_json(reference).await?;
    Ok(availability_from_probe(&info))
}
