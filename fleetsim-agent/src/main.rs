// Fleetsim Agent - Simulated device fleet telemetry agent
//
// Licensed under the MIT license. See LICENSE file for details.

//! # Fleetsim Agent
//!
//! Drives a simulated device fleet against an ingestion endpoint: batches of
//! random-walk readings are gzip-compressed and published on a fixed cadence
//! until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! # Publish to a TCP ingestion endpoint
//! fleetsim-agent --endpoint 127.0.0.1:4000
//!
//! # Dry run: log payload sizes instead of sending
//! fleetsim-agent --devices 5 --batch-size 50 --interval-ms 1000
//!
//! # Reproducible walks from a settings file
//! fleetsim-agent --config agent.json --seed 42
//! ```

mod config;
mod publisher;

use clap::Parser;
use fleetsim::{
    DeviceFleet, FleetsimError, PublishLoop, PublishLoopConfig, Publisher, TelemetryBatcher,
};
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use config::{AgentConfig, Args};
use publisher::{LogPublisher, TcpPublisher};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    info!("Fleetsim agent v{}. Ctrl-C to exit.", fleetsim::VERSION);

    let config = match AgentConfig::resolve(&args) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(config).await {
        error!(error = %err, "stopped because of error");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config: AgentConfig) -> fleetsim::Result<()> {
    let fleet = DeviceFleet::new(config.devices)?;
    info!(devices = fleet.len(), "fleet initialized");

    let batcher = match config.seed {
        Some(seed) => TelemetryBatcher::with_seed(fleet, seed),
        None => TelemetryBatcher::new(fleet),
    };

    let loop_config = PublishLoopConfig::default()
        .with_batch_size(config.batch_size)
        .with_publish_interval(config.interval)
        .with_retry(config.retry_policy())
        .with_publish_timeout(config.publish_timeout);

    let shutdown = spawn_shutdown_listener();

    match &config.endpoint {
        Some(endpoint) => {
            let publisher = TcpPublisher::connect(endpoint)
                .await
                .map_err(FleetsimError::Publish)?;
            run_loop(batcher, publisher, loop_config, shutdown).await
        }
        None => {
            info!("no endpoint configured, payloads will be logged and discarded");
            run_loop(batcher, LogPublisher::default(), loop_config, shutdown).await
        }
    }
}

/// Translate Ctrl-C into the loop's shutdown signal
fn spawn_shutdown_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            let _ = tx.send(true);
        }
    });
    rx
}

async fn run_loop<P: Publisher>(
    batcher: TelemetryBatcher,
    publisher: P,
    config: PublishLoopConfig,
    shutdown: watch::Receiver<bool>,
) -> fleetsim::Result<()> {
    let mut publish_loop = PublishLoop::new(batcher, publisher, config)?;
    let result = publish_loop.run(shutdown).await;
    info!("{}", publish_loop.stats().report());
    result
}
