//! # Fleetsim - Simulated device fleet telemetry
//!
//! Simulates a fleet of telemetry-emitting devices: each device produces a
//! bounded random walk of temperature and humidity readings, and the fleet's
//! readings are batched in round-robin order, gzip-compressed and handed to
//! a pluggable publisher on a fixed cadence.
//!
//! ## Key Features
//!
//! - **Bounded random walks**: per-device stateful walks, clamped to sensor
//!   ranges, with an injectable generator for deterministic tests
//! - **Round-robin batching**: a persistent cursor keeps sampling fair
//!   across batches
//! - **Compressed payloads**: JSON batches compressed with gzip, with both
//!   byte counts reported
//! - **Resilient publishing**: configurable retry policy, optional
//!   per-attempt timeout, cancellable wait state
//!
//! ## Quick Start
//!
//! ```rust
//! use fleetsim::{DeviceFleet, PayloadEncoder, TelemetryBatcher};
//!
//! // Four devices, deterministic walks
//! let fleet = DeviceFleet::new(4).unwrap();
//! let mut batcher = TelemetryBatcher::with_seed(fleet, 42);
//!
//! // One batch in strict rotation
//! let batch = batcher.next_batch(8).unwrap();
//! assert_eq!(batch.len(), 8);
//!
//! // Compress and round-trip
//! let encoder = PayloadEncoder::new();
//! let payload = encoder.encode(&batch).unwrap();
//! assert!(payload.compressed_len() > 0);
//! assert_eq!(encoder.decode(payload.bytes()).unwrap(), batch);
//! ```
//!
//! ## Modules
//!
//! - [`device`]: the per-device random-walk model
//! - [`fleet`]: fleet ownership and round-robin batch assembly
//! - [`payload`]: batch serialization and gzip compression
//! - [`publisher`]: the transport boundary and an in-memory test double
//! - [`retry`]: retry policies for failed publish attempts
//! - [`publish_loop`]: the assemble/encode/publish/wait cycle
//! - [`metrics`]: pipeline statistics

// Modules
pub mod device;
pub mod error;
pub mod fleet;
pub mod metrics;
pub mod payload;
pub mod publish_loop;
pub mod publisher;
pub mod retry;

// Re-exports for convenient access
pub use device::{
    DeviceModel, Reading, HUMIDITY_STEP, MAX_HUMIDITY, MAX_TEMPERATURE, MIN_HUMIDITY,
    MIN_TEMPERATURE, TEMPERATURE_STEP,
};
pub use error::{ConfigError, EncodeError, FleetsimError, PublishError, Result};
pub use fleet::{DeviceFleet, TelemetryBatcher};
pub use metrics::TelemetryStats;
pub use payload::{EncodedPayload, PayloadEncoder};
pub use publish_loop::{PublishLoop, PublishLoopConfig};
pub use publisher::{MemoryPublisher, Publisher};
pub use retry::RetryPolicy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of simulated devices
pub const DEFAULT_FLEET_SIZE: usize = 10;

/// Default number of readings per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default delay between publish cycles in milliseconds
pub const DEFAULT_PUBLISH_INTERVAL_MS: u64 = 5000;
