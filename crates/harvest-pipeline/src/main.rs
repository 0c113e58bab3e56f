//! Audio/subtitle harvesting binary.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use harvest_models::WorkItem;
use harvest_pipeline::{PipelineConfig, PipelineCoordinator, RunLog, S3Store, YtDlp};
use harvest_source::{Batch, CompletionStatus, SourceClient};
use harvest_storage::S3Client;

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::from_default_env().add_directive("harvest=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting audioharvest");

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let source = match SourceClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create source client: {}", e);
            std::process::exit(1);
        }
    };

    let (references, batch_id) = match source.fetch_batch().await {
        Ok(Batch::Items { items, batch_id }) => (
            items.into_iter().map(|i| i.reference).collect::<Vec<_>>(),
            batch_id,
        ),
        Ok(Batch::NoWork { message }) => {
            info!("Nothing to process: {}", message);
            return;
        }
        Err(e) => {
            error!("Failed to fetch batch: {}", e);
            std::process::exit(1);
        }
    };

    if references.is_empty() {
        info!("Batch contained no usable references");
        return;
    }

    let items = WorkItem::batch(references);

    let run_log = match RunLog::open(&config.run_log_path) {
        Ok(log) => Arc::new(log),
        Err(e) => {
            error!("Failed to open run log: {}", e);
            std::process::exit(1);
        }
    };

    let store = match S3Client::from_env() {
        Ok(client) => S3Store::new(client),
        Err(e) => {
            error!("Failed to create object store client: {}", e);
            std::process::exit(1);
        }
    };

    let ytdlp = YtDlp::new();
    let coordinator = PipelineCoordinator::new(config);

    let summary = match coordinator
        .run(ytdlp.clone(), ytdlp, store, run_log, items)
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            error!("Pipeline run failed: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        errored = summary.errored,
        success_rate = format!("{:.1}%", summary.success_rate()),
        "Run finished: {}",
        summary.message()
    );

    if let Some(batch_id) = batch_id {
        let status = if summary.errored == 0 {
            CompletionStatus::Completed
        } else {
            CompletionStatus::Partial
        };
        if let Err(e) = source
            .notify_completion(&batch_id, status, &summary.message())
            .await
        {
            warn!("Failed to report completion: {}", e);
        }
    }

    // A run with item-level errors still reports to the API, but the
    // process itself exits nonzero so schedulers can see the failure.
    if summary.errored > 0 {
        std::process::exit(1);
    }
}
