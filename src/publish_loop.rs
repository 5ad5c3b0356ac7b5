// Fleetsim - Simulated device fleet telemetry pipeline
//
// Licensed under the MIT license. See LICENSE file for details.

//! Publish cycle state machine
//!
//! Drives the infinite cycle AssembleBatch -> Encode -> Publish -> Wait.
//! Cycles never overlap: the next batch is not assembled until the previous
//! publish attempt has resolved. The shutdown signal is observed at cycle
//! boundaries and cancels the inter-cycle sleep.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, FleetsimError, PublishError, Result};
use crate::fleet::TelemetryBatcher;
use crate::metrics::TelemetryStats;
use crate::payload::PayloadEncoder;
use crate::publisher::Publisher;
use crate::retry::RetryPolicy;
use crate::{DEFAULT_BATCH_SIZE, DEFAULT_PUBLISH_INTERVAL_MS};

/// Configuration for the publish cycle
#[derive(Debug, Clone)]
pub struct PublishLoopConfig {
    /// Readings drawn from the fleet per batch
    pub batch_size: usize,
    /// Pause between cycles
    pub publish_interval: Duration,
    /// Retry policy applied around the publish state
    pub retry: RetryPolicy,
    /// Per-attempt timeout; `None` relies on the publisher's own policy
    pub publish_timeout: Option<Duration>,
}

impl Default for PublishLoopConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            publish_interval: Duration::from_millis(DEFAULT_PUBLISH_INTERVAL_MS),
            retry: RetryPolicy::None,
            publish_timeout: None,
        }
    }
}

impl PublishLoopConfig {
    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the inter-cycle delay
    pub fn with_publish_interval(mut self, interval: Duration) -> Self {
        self.publish_interval = interval;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set or clear the per-attempt publish timeout
    pub fn with_publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }
}

/// Orchestrates batch assembly, encoding and publishing
#[derive(Debug)]
pub struct PublishLoop<P: Publisher> {
    batcher: TelemetryBatcher,
    encoder: PayloadEncoder,
    publisher: P,
    config: PublishLoopConfig,
    stats: TelemetryStats,
    cycle: u64,
}

impl<P: Publisher> PublishLoop<P> {
    /// Create a publish loop; fails fast on a zero batch size
    pub fn new(batcher: TelemetryBatcher, publisher: P, config: PublishLoopConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize.into());
        }

        Ok(Self {
            batcher,
            encoder: PayloadEncoder::new(),
            publisher,
            config,
            stats: TelemetryStats::new(),
            cycle: 0,
        })
    }

    /// Replace the default payload encoder
    pub fn with_encoder(mut self, encoder: PayloadEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Run cycles until the shutdown signal flips to `true` or a publish
    /// fails beyond the retry policy.
    ///
    /// The signal is checked before each cycle and cancels the Wait state;
    /// an in-flight publish attempt is allowed to resolve first.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        while !*shutdown.borrow() {
            self.run_cycle().await?;

            debug!(
                delay_ms = self.config.publish_interval.as_millis() as u64,
                "waiting before next cycle"
            );
            tokio::select! {
                _ = sleep(self.config.publish_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(cycles = self.cycle, "publish loop stopped");
        Ok(())
    }

    /// One full AssembleBatch -> Encode -> Publish pass
    pub async fn run_cycle(&mut self) -> Result<()> {
        let batch = self.batcher.next_batch(self.config.batch_size)?;
        let payload = self.encoder.encode(&batch)?;

        info!(
            batch = self.cycle + 1,
            readings = batch.len(),
            uncompressed_bytes = payload.uncompressed_len(),
            compressed_bytes = payload.compressed_len(),
            "publishing telemetry batch"
        );

        match self.publish_with_retry(payload.bytes()).await {
            Ok(()) => {
                self.cycle += 1;
                self.stats.record_publish(
                    batch.len(),
                    payload.uncompressed_len(),
                    payload.compressed_len(),
                );
                info!(batch = self.cycle, "batch sent");
                Ok(())
            }
            Err(err) => {
                self.stats.record_failure();
                Err(err)
            }
        }
    }

    async fn publish_with_retry(&mut self, payload: &[u8]) -> Result<()> {
        let mut attempt: u32 = 0;
        loop {
            let err = match self.publish_once(payload).await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            match self.config.retry.delay_for_attempt(attempt) {
                Some(delay) => {
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "publish failed, backing off"
                    );
                    self.stats.record_retry();
                    sleep(delay).await;
                    attempt += 1;
                }
                None if attempt == 0 => return Err(FleetsimError::Publish(err)),
                None => {
                    return Err(FleetsimError::RetriesExhausted {
                        attempts: attempt + 1,
                        source: err,
                    })
                }
            }
        }
    }

    async fn publish_once(&mut self, payload: &[u8]) -> std::result::Result<(), PublishError> {
        match self.config.publish_timeout {
            Some(limit) => match timeout(limit, self.publisher.publish(payload)).await {
                Ok(result) => result,
                Err(_) => Err(PublishError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => self.publisher.publish(payload).await,
        }
    }

    /// Pipeline statistics accumulated so far
    pub fn stats(&self) -> &TelemetryStats {
        &self.stats
    }

    /// Number of completed cycles
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// The underlying publisher
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// The batcher driving the fleet
    pub fn batcher(&self) -> &TelemetryBatcher {
        &self.batcher
    }
}
