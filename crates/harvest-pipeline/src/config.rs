//! Pipeline configuration.
//!
//! The core never reads the process environment; `from_env` is called once
//! in `main` and the resulting struct is passed down explicitly.

use std::path::PathBuf;

/// Per-item processing configuration.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Folder prefix for object-store keys.
    pub key_prefix: String,
    /// Subtitle language codes in preference order.
    pub preferred_languages: Vec<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            key_prefix: "corpus".to_string(),
            preferred_languages: vec!["tr".to_string(), "en".to_string()],
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed worker pool size.
    pub concurrency: usize,
    /// Append-only CSV run log path.
    pub run_log_path: PathBuf,
    /// Per-item processing settings.
    pub processor: ProcessorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            run_log_path: PathBuf::from("download_log.csv"),
            processor: ProcessorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = ProcessorConfig::default();

        Self {
            concurrency: std::env::var("HARVEST_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(8),
            run_log_path: std::env::var("HARVEST_RUN_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("download_log.csv")),
            processor: ProcessorConfig {
                key_prefix: std::env::var("S3_FOLDER").unwrap_or(defaults.key_prefix),
                preferred_languages: std::env::var("HARVEST_SUBTITLE_LANGS")
                    .map(|s| {
                        s.split(',')
                            .map(|c| c.trim().to_string())
                            .filter(|c| !c.is_empty())
                            .collect()
                    })
                    .ok()
                    .filter(|langs: &Vec<String>| !langs.is_empty())
                    .unwrap_or(defaults.preferred_languages),
            },
        }
    }
}
