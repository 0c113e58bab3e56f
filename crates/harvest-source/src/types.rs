//! Wire types for the coordination API.

use serde::{Deserialize, Serialize};

use harvest_models::extract_reference;

/// One entry from the batch listing, with the raw line preserved for
/// audit logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub reference: String,
    pub raw_line: String,
}

/// Result of asking the API for work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// Items to process, plus the batch identifier to report back with.
    Items {
        items: Vec<BatchItem>,
        batch_id: Option<String>,
    },
    /// Nothing left to do; terminal for this run, not an error.
    NoWork { message: String },
}

/// Aggregate status reported back to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Completed,
    Partial,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Completed => "completed",
            CompletionStatus::Partial => "partial",
        }
    }
}

/// Raw batch response payload.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchPayload {
    pub status: String,
    #[serde(default)]
    pub video_list: Vec<serde_json::Value>,
    #[serde(default)]
    pub list_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub active_processes: Option<u64>,
    #[serde(default)]
    pub processed_files: Option<u64>,
}

/// Completion notification payload.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionPayload<'a> {
    pub list_id: &'a str,
    pub status: CompletionStatus,
    pub message: &'a str,
    pub timestamp: String,
}

/// Turn one raw listing entry into a batch item.
///
/// Entries are either JSON objects carrying a `video_url` field or plain
/// strings (bare URL or pipe-delimited record). Entries without a usable
/// reference are dropped.
pub(crate) fn item_from_value(value: &serde_json::Value) -> Option<BatchItem> {
    match value {
        serde_json::Value::Object(map) => {
            let url = map.get("video_url")?.as_str()?.trim();
            if url.is_empty() {
                return None;
            }
            Some(BatchItem {
                reference: url.to_string(),
                raw_line: value.to_string(),
            })
        }
        serde_json::Value::String(line) => Some(BatchItem {
            reference: extract_reference(line)?,
            raw_line: line.clone(),
        }),
        _ => None,
    }
}
