//! Coordination API HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};
use crate::types::{item_from_value, Batch, BatchPayload, CompletionPayload, CompletionStatus};

/// Configuration for the source client.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the coordination API
    pub base_url: String,
    /// Timeout for the batch fetch
    pub fetch_timeout: Duration,
    /// Timeout for the completion notification
    pub notify_timeout: Duration,
}

impl SourceConfig {
    /// Create config from environment variables.
    pub fn from_env() -> SourceResult<Self> {
        Ok(Self {
            base_url: std::env::var("API_BASE_URL")
                .map_err(|_| SourceError::config_error("API_BASE_URL not set"))?,
            fetch_timeout: Duration::from_secs(
                std::env::var("API_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            notify_timeout: Duration::from_secs(
                std::env::var("API_NOTIFY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }
}

/// Client for the batch coordination API.
pub struct SourceClient {
    http: Client,
    config: SourceConfig,
}

impl SourceClient {
    /// Create a new source client.
    pub fn new(config: SourceConfig) -> SourceResult<Self> {
        let http = Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(SourceError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SourceResult<Self> {
        Self::new(SourceConfig::from_env()?)
    }

    /// Fetch the next batch of work.
    ///
    /// Distinguishes three response states: items available, nothing left to
    /// do (`NoWork`, terminal but clean), and everything else (an error).
    pub async fn fetch_batch(&self) -> SourceResult<Batch> {
        let url = format!("{}/get-video-list", self.config.base_url);
        debug!("Fetching batch from {}", url);

        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::RequestFailed(format!(
                "batch fetch returned {}: {}",
                status, body
            )));
        }

        let payload: BatchPayload = response.json().await?;

        match payload.status.as_str() {
            "success" => {
                let items: Vec<_> = payload.video_list.iter().filter_map(item_from_value).collect();
                info!(
                    count = items.len(),
                    batch_id = payload.list_id.as_deref().unwrap_or("-"),
                    "Fetched batch from API"
                );
                Ok(Batch::Items {
                    items,
                    batch_id: payload.list_id,
                })
            }
            "no_more_files" => {
                let message = payload
                    .message
                    .unwrap_or_else(|| "all files processed".to_string());
                info!(
                    active = payload.active_processes.unwrap_or(0),
                    processed = payload.processed_files.unwrap_or(0),
                    "API reports no work available: {}",
                    message
                );
                Ok(Batch::NoWork { message })
            }
            other => Err(SourceError::unexpected_status(
                other,
                payload.message.unwrap_or_default(),
            )),
        }
    }

    /// Report the aggregate run status back to the API.
    ///
    /// Best effort: failures are logged by the caller and never abort the
    /// run. A missing batch id is a no-op.
    pub async fn notify_completion(
        &self,
        batch_id: &str,
        status: CompletionStatus,
        message: &str,
    ) -> SourceResult<()> {
        let url = format!("{}/notify-completion", self.config.base_url);

        let payload = CompletionPayload {
            list_id: batch_id,
            status,
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let response = self
            .http
            .post(&url)
            .timeout(self.config.notify_timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status_code = response.status();
            warn!("Completion notification returned {}", status_code);
            return Err(SourceError::RequestFailed(format!(
                "notify returned {}",
                status_code
            )));
        }

        info!(batch_id = batch_id, status = status.as_str(), "Reported completion to API");
        Ok(())
    }
}
