//! Deterministic object-store key derivation.
//!
//! Keys are built from sanitized owner and title names so existence checks
//! are meaningful across runs: the same (owner, title) pair must always map
//! to the same keys.

/// Maximum sanitized title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum sanitized owner length in characters.
pub const MAX_OWNER_CHARS: usize = 50;

/// Sanitize a name for use in a storage key.
///
/// Keeps alphanumerics, spaces and `-_()`; everything else becomes `_`.
/// Truncation happens on character boundaries. The transform is idempotent:
/// sanitizing an already-sanitized string is a no-op.
pub fn sanitize_component(raw: &str, max_chars: usize) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .take(max_chars)
        .collect()
}

/// The pair of object-store keys expected for one item, plus the scratch
/// filename stem shared by its local artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKeys {
    /// Key for the WAV audio artifact.
    pub audio: String,
    /// Key for the SRT subtitle artifact.
    pub subtitle: String,
    /// Sanitized title, used as the local scratch filename stem.
    pub stem: String,
    /// Sanitized owner name.
    pub owner: String,
}

impl ArtifactKeys {
    /// Derive keys from a folder prefix and the raw owner/title names.
    pub fn derive(prefix: &str, owner: &str, title: &str) -> Self {
        let owner = sanitize_component(owner, MAX_OWNER_CHARS);
        let stem = sanitize_component(title, MAX_TITLE_CHARS);

        Self {
            audio: format!("{}/{}/{}.wav", prefix, owner, stem),
            subtitle: format!("{}/{}/{}.srt", prefix, owner, stem),
            stem,
            owner,
        }
    }
}
