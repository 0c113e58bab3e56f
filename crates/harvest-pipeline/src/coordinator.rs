//! Bounded-concurrency run coordinator.
//!
//! Owns the scratch directory, the worker pool, and the shared progress
//! tracker. Every item's outcome is recorded in the worker that produced
//! it, so the run log and progress output stream as the run advances.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use harvest_models::WorkItem;

use crate::collaborators::{MediaFetcher, MediaResolver, ObjectStore};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::processor::ItemProcessor;
use crate::progress::{ProgressTracker, RunSummary};
use crate::runlog::RunLog;

/// Startup jitter bounds, per worker task.
const JITTER_MIN_MS: u64 = 1_000;
const JITTER_MAX_MS: u64 = 3_000;

pub struct PipelineCoordinator {
    config: PipelineConfig,
}

impl PipelineCoordinator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Process `items` through a pool of at most `concurrency` workers.
    ///
    /// Scratch files live in a temporary directory that is removed when the
    /// run ends, on every exit path.
    pub async fn run<R, F, S>(
        &self,
        resolver: R,
        fetcher: F,
        store: S,
        run_log: Arc<RunLog>,
        items: Vec<WorkItem>,
    ) -> PipelineResult<RunSummary>
    where
        R: MediaResolver + 'static,
        F: MediaFetcher + 'static,
        S: ObjectStore + 'static,
    {
        let scratch = tempfile::Builder::new().prefix("harvest-").tempdir()?;
        let progress = Arc::new(ProgressTracker::new(items.len()));
        let processor = Arc::new(ItemProcessor::new(
            resolver,
            fetcher,
            store,
            self.config.processor.clone(),
            scratch.path().to_path_buf(),
        ));
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        info!(
            items = items.len(),
            concurrency = self.config.concurrency,
            scratch = %scratch.path().display(),
            "Starting run"
        );

        let mut tasks = JoinSet::new();
        for item in items {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed, cannot happen here
            };
            let processor = Arc::clone(&processor);
            let progress = Arc::clone(&progress);
            let run_log = Arc::clone(&run_log);

            tasks.spawn(async move {
                let _permit = permit;

                // Stagger bursts against the media host
                let jitter =
                    Duration::from_millis(rand::rng().random_range(JITTER_MIN_MS..=JITTER_MAX_MS));
                tokio::time::sleep(jitter).await;

                let outcome = processor.process(&item).await;

                progress.record(&outcome);
                if let Err(e) = run_log.record(&outcome) {
                    warn!(reference = %outcome.reference, "Failed to write run log row: {}", e);
                }
                info!("{}", progress.summary_string());
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Worker task failed to join: {}", e);
            }
        }

        Ok(progress.finish())
    }
}
