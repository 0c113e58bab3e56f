//! Work items drawn from a batch.

/// One unit of work: a single media reference from a batch.
///
/// Immutable once created; the sequence index and total are carried only for
/// human-readable progress output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Opaque locator for the media (usually a URL).
    pub reference: String,
    /// 1-based position of this item in the batch.
    pub sequence_index: usize,
    /// Number of items in the batch.
    pub total: usize,
}

impl WorkItem {
    /// Build the full batch from a list of references.
    pub fn batch(references: Vec<String>) -> Vec<Self> {
        let total = references.len();
        references
            .into_iter()
            .enumerate()
            .map(|(i, reference)| Self {
                reference,
                sequence_index: i + 1,
                total,
            })
            .collect()
    }

    /// Progress tag like `[3/40]` for log lines.
    pub fn position(&self) -> String {
        format!("[{}/{}]", self.sequence_index, self.total)
    }
}

/// Extract a media reference from one raw batch line.
///
/// A line is either a bare URL, or a pipe-delimited record whose second field
/// is the URL (`index|url|...`). Returns `None` for anything else.
pub fn extract_reference(raw: &str) -> Option<String> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with("https://") || line.starts_with("http://") {
        return Some(line.to_string());
    }

    let mut parts = line.split('|');
    let _index = parts.next()?;
    let url = parts.next()?.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}
