//! Artifact fetching via yt-dlp.
//!
//! Two stage-scoped entry points: [`fetch_subtitle`] materializes an SRT
//! track and [`fetch_audio`] materializes a WAV track, both into a
//! caller-owned scratch directory. Audio fetches report lifecycle events
//! through a [`FetchObserver`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use harvest_models::SubtitleTrack;

use crate::error::{MediaError, MediaResult};

/// Observer for audio fetch lifecycle events.
///
/// Passed explicitly into the fetch call; implementations must be cheap, the
/// fetch blocks on them. Both methods default to no-ops, so implementors
/// override only the events they care about.
pub trait FetchObserver: Send + Sync {
    fn on_fetch_started(&self, reference: &str) {
        let _ = reference;
    }

    fn on_fetch_finished(&self, reference: &str, path: &Path, bytes: u64) {
        let _ = (reference, path, bytes);
    }
}

/// Fetch the subtitle track for `reference` in the given language.
///
/// Returns the local SRT path, or `None` when yt-dlp completed without
/// materializing a subtitle file (the track exists in the listing but is not
/// actually retrievable, which happens for some automatic captions).
pub async fn fetch_subtitle(
    reference: &str,
    language: &str,
    track: SubtitleTrack,
    dest_dir: &Path,
    stem: &str,
) -> MediaResult<Option<PathBuf>> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    let template = dest_dir.join(format!("{stem}.%(ext)s"));
    let template = template.to_string_lossy();

    let write_flag = match track {
        SubtitleTrack::Manual => "--write-subs",
        SubtitleTrack::Auto => "--write-auto-subs",
    };

    debug!(
        reference = reference,
        language = language,
        track = %track,
        "Fetching subtitle track"
    );

    let output = Command::new("yt-dlp")
        .args([
            "--skip-download",
            write_flag,
            "--sub-langs",
            language,
            "--convert-subs",
            "srt",
            "--no-playlist",
            "--no-warnings",
            "-o",
            &template,
            reference,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp subtitle stderr: {}", stderr);
        return Err(MediaError::fetch_failed(format!(
            "subtitle fetch failed: {}",
            stderr.lines().last().unwrap_or("Unknown error")
        )));
    }

    Ok(find_subtitle_file(dest_dir, stem)?)
}

/// Fetch the audio track for `reference` as WAV.
///
/// yt-dlp extracts the best audio stream and converts it via its FFmpeg
/// post-processor; the output lands at `<dest_dir>/<stem>.wav`.
pub async fn fetch_audio(
    reference: &str,
    dest_dir: &Path,
    stem: &str,
    observer: &dyn FetchObserver,
) -> MediaResult<PathBuf> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    let template = dest_dir.join(format!("{stem}.%(ext)s"));
    let template = template.to_string_lossy();
    let wav_path = dest_dir.join(format!("{stem}.wav"));

    observer.on_fetch_started(reference);

    let output = Command::new("yt-dlp")
        .args([
            "-f",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            "wav",
            "--audio-quality",
            "192K",
            "--no-playlist",
            "--no-warnings",
            "-o",
            &template,
            reference,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp audio stderr: {}", stderr);
        return Err(MediaError::fetch_failed(format!(
            "audio fetch failed: {}",
            stderr.lines().last().unwrap_or("Unknown error")
        )));
    }

    if !wav_path.exists() {
        return Err(MediaError::fetch_failed("audio output file not created"));
    }

    let bytes = wav_path.metadata()?.len();
    observer.on_fetch_finished(reference, &wav_path, bytes);

    info!(
        reference = reference,
        output = %wav_path.display(),
        size_mb = bytes as f64 / (1024.0 * 1024.0),
        "Fetched audio track"
    );

    Ok(wav_path)
}

/// Find the subtitle file for `stem` in `dir`.
///
/// yt-dlp embeds the language tag in the filename (`<stem>.<lang>.srt`), so
/// this matches any `.srt` whose name starts with the stem.
pub fn find_subtitle_file(dir: &Path, stem: &str) -> std::io::Result<Option<PathBuf>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with(stem) && name.ends_with(".srt") {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_subtitle_file_with_language_tag() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("My Video.tr.srt"), "1\n").unwrap();
        std::fs::write(dir.path().join("Other Video.en.srt"), "1\n").unwrap();

        let found = find_subtitle_file(dir.path(), "My Video").unwrap().unwrap();
        assert_eq!(
            found.file_name().unwrap().to_str().unwrap(),
            "My Video.tr.srt"
        );
    }

    #[test]
    fn test_find_subtitle_file_ignores_other_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("My Video.wav"), b"riff").unwrap();
        std::fs::write(dir.path().join("My Video.vtt"), "WEBVTT\n").unwrap();

        assert!(find_subtitle_file(dir.path(), "My Video").unwrap().is_none());
    }

    #[test]
    fn test_find_subtitle_file_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_subtitle_file(dir.path(), "anything").unwrap().is_none());
    }
}
