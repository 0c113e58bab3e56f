//! Append-only CSV run log.
//!
//! Each outcome becomes one row. The file survives across runs; the header
//! is written only when the file is created.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;

use harvest_models::Outcome;

use crate::error::{PipelineError, PipelineResult};

const HEADER: [&str; 5] = ["timestamp", "owner", "reference", "status", "message"];

/// Shared, append-only outcome log.
pub struct RunLog {
    writer: Mutex<csv::Writer<std::fs::File>>,
}

impl RunLog {
    /// Open (or create) the log at `path` in append mode.
    pub fn open(path: &Path) -> PipelineResult<Self> {
        let is_new = !path.exists() || std::fs::metadata(path)?.len() == 0;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    /// Append one outcome row and flush.
    pub fn record(&self, outcome: &Outcome) -> PipelineResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| PipelineError::internal("run log lock poisoned"))?;
        writer.write_record([
            Utc::now().to_rfc3339().as_str(),
            outcome.owner.as_deref().unwrap_or("unknown"),
            outcome.reference.as_str(),
            outcome.status_label(),
            outcome.log_message().as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}
