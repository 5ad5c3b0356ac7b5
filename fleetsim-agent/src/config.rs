// Fleetsim Agent - Simulated device fleet telemetry agent
//
// Licensed under the MIT license. See LICENSE file for details.

//! Agent configuration
//!
//! Settings come from CLI flags, an optional JSON settings file, and
//! built-in defaults, in that order of precedence. Everything is read once
//! at startup and immutable afterwards.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use fleetsim::{RetryPolicy, DEFAULT_BATCH_SIZE, DEFAULT_FLEET_SIZE, DEFAULT_PUBLISH_INTERVAL_MS};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_RETRY_INITIAL_MS: u64 = 500;
const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 30_000;

/// Simulated device fleet telemetry agent
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON settings file; flags take precedence over file values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ingestion endpoint (host:port); omit to log payloads instead of sending
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Number of simulated devices
    #[arg(short, long)]
    pub devices: Option<usize>,

    /// Readings per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Delay between batches in milliseconds
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    /// Random seed for reproducible walks
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum publish retries (0 disables retrying)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Initial retry backoff in milliseconds
    #[arg(long)]
    pub retry_initial_ms: Option<u64>,

    /// Per-publish timeout in milliseconds (0 disables the timeout)
    #[arg(long)]
    pub publish_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// File-backed settings, all optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    endpoint: Option<String>,
    devices: Option<usize>,
    batch_size: Option<usize>,
    interval_ms: Option<u64>,
    seed: Option<u64>,
    max_retries: Option<u32>,
    retry_initial_ms: Option<u64>,
    publish_timeout_ms: Option<u64>,
}

/// Errors while loading the settings file
#[derive(Error, Debug)]
pub enum ConfigFileError {
    /// File could not be read
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for the expected shape
    #[error("cannot parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fully resolved agent settings
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Ingestion endpoint; `None` selects the log-only publisher
    pub endpoint: Option<String>,
    /// Fleet size
    pub devices: usize,
    /// Readings per batch
    pub batch_size: usize,
    /// Delay between publish cycles
    pub interval: Duration,
    /// Optional seed for reproducible walks
    pub seed: Option<u64>,
    /// Maximum publish retries
    pub max_retries: u32,
    /// Initial retry backoff
    pub retry_initial: Duration,
    /// Per-publish timeout; `None` relies on the transport
    pub publish_timeout: Option<Duration>,
}

impl AgentConfig {
    /// Resolve flags over file settings over defaults
    pub fn resolve(args: &Args) -> Result<Self, ConfigFileError> {
        let file = match &args.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str::<FileSettings>(&raw).map_err(|source| {
                    ConfigFileError::Parse {
                        path: path.clone(),
                        source,
                    }
                })?
            }
            None => FileSettings::default(),
        };

        let publish_timeout_ms = args
            .publish_timeout_ms
            .or(file.publish_timeout_ms)
            .unwrap_or(DEFAULT_PUBLISH_TIMEOUT_MS);

        Ok(Self {
            endpoint: args.endpoint.clone().or(file.endpoint),
            devices: args.devices.or(file.devices).unwrap_or(DEFAULT_FLEET_SIZE),
            batch_size: args
                .batch_size
                .or(file.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            interval: Duration::from_millis(
                args.interval_ms
                    .or(file.interval_ms)
                    .unwrap_or(DEFAULT_PUBLISH_INTERVAL_MS),
            ),
            seed: args.seed.or(file.seed),
            max_retries: args
                .max_retries
                .or(file.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            retry_initial: Duration::from_millis(
                args.retry_initial_ms
                    .or(file.retry_initial_ms)
                    .unwrap_or(DEFAULT_RETRY_INITIAL_MS),
            ),
            publish_timeout: if publish_timeout_ms > 0 {
                Some(Duration::from_millis(publish_timeout_ms))
            } else {
                None
            },
        })
    }

    /// Retry policy derived from the resolved settings
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.max_retries == 0 {
            RetryPolicy::None
        } else {
            RetryPolicy::exponential(self.max_retries, self.retry_initial)
        }
    }
}
