//! Device fleet and round-robin batch assembly
//!
//! A [`DeviceFleet`] owns an ordered, fixed-size set of devices; the
//! [`TelemetryBatcher`] draws readings from it in strict rotation. The
//! rotation cursor persists across batches, so over many batches every
//! device is sampled with equal frequency.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::device::{DeviceModel, Reading};
use crate::error::{ConfigError, Result};

/// Ordered, fixed-size collection of simulated devices
#[derive(Debug, Clone)]
pub struct DeviceFleet {
    devices: Vec<DeviceModel>,
}

impl DeviceFleet {
    /// Create a fleet of `size` devices with default state and fresh identifiers.
    ///
    /// Fails fast on an empty fleet; membership never changes afterwards.
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(ConfigError::EmptyFleet.into());
        }
        Ok(Self {
            devices: (0..size).map(|_| DeviceModel::new()).collect(),
        })
    }

    /// Number of devices in the fleet
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the fleet has no devices (never true for a constructed fleet)
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Device at `index` in rotation order
    pub fn get(&self, index: usize) -> Option<&DeviceModel> {
        self.devices.get(index)
    }

    /// Iterate over devices in rotation order
    pub fn devices(&self) -> impl Iterator<Item = &DeviceModel> {
        self.devices.iter()
    }
}

/// Assembles telemetry batches by drawing from a fleet in strict rotation
#[derive(Debug)]
pub struct TelemetryBatcher {
    fleet: DeviceFleet,
    cursor: usize,
    rng: StdRng,
}

impl TelemetryBatcher {
    /// Create a batcher with an entropy-seeded generator
    pub fn new(fleet: DeviceFleet) -> Self {
        Self {
            fleet,
            cursor: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a batcher with a deterministic generator for reproducible walks
    pub fn with_seed(fleet: DeviceFleet, seed: u64) -> Self {
        Self {
            fleet,
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw the next `size` readings in round-robin order.
    ///
    /// Each draw steps the device at the cursor and advances the cursor,
    /// wrapping at the fleet size. The cursor carries over between calls:
    /// the first device of the next batch is the successor of the last
    /// device of this one.
    pub fn next_batch(&mut self, size: usize) -> Result<Vec<Reading>> {
        if size == 0 {
            return Err(ConfigError::ZeroBatchSize.into());
        }

        let mut batch = Vec::with_capacity(size);
        for _ in 0..size {
            let device = &mut self.fleet.devices[self.cursor];
            batch.push(device.next_value(&mut self.rng));
            self.cursor = (self.cursor + 1) % self.fleet.devices.len();
        }
        Ok(batch)
    }

    /// Current rotation cursor (index of the next device to sample)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The fleet being sampled
    pub fn fleet(&self) -> &DeviceFleet {
        &self.fleet
    }
}
