//! Simulated device model
//!
//! A `DeviceModel` is one simulated sensor node: an immutable identity plus
//! the current temperature and humidity readings. Each call to
//! [`DeviceModel::next_value`] advances a bounded random walk and returns an
//! immutable [`Reading`] snapshot, so batch assembly can accumulate values
//! while the model keeps mutating.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest reportable temperature, in degrees Celsius
pub const MIN_TEMPERATURE: f64 = -40.0;
/// Highest reportable temperature, in degrees Celsius
pub const MAX_TEMPERATURE: f64 = 100.0;

/// Lowest reportable relative humidity, in percent
pub const MIN_HUMIDITY: f64 = 0.0;
/// Highest reportable relative humidity, in percent
pub const MAX_HUMIDITY: f64 = 100.0;

/// Largest temperature change per walk step (symmetric around zero)
pub const TEMPERATURE_STEP: f64 = 7.5;
/// Largest humidity change per walk step (symmetric around zero)
pub const HUMIDITY_STEP: f64 = 10.0;

const DEFAULT_TEMPERATURE: f64 = 20.0;
const DEFAULT_HUMIDITY: f64 = 60.0;

/// One simulated telemetry-emitting device
#[derive(Debug, Clone)]
pub struct DeviceModel {
    id: Uuid,
    temperature: f64,
    humidity: f64,
}

impl DeviceModel {
    /// Create a device with default readings and a freshly generated identifier
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
        }
    }

    /// Create a device with explicit state
    pub fn with_state(id: Uuid, temperature: f64, humidity: f64) -> Self {
        Self {
            id,
            temperature,
            humidity,
        }
    }

    /// Device identifier, fixed for the device's lifetime
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current temperature in degrees Celsius
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Current relative humidity in percent
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Advance the random walk by one step and snapshot the result.
    ///
    /// Temperature moves by a uniform delta of at most [`TEMPERATURE_STEP`]
    /// in either direction and is clamped to the temperature range; humidity
    /// moves by at most [`HUMIDITY_STEP`] and is clamped to the humidity
    /// range. The humidity clamp must use [`MAX_HUMIDITY`] even though both
    /// ranges share the value 100.
    ///
    /// The walk is stateful: repeated calls continue from the previous value,
    /// they are not independent samples.
    pub fn next_value<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Reading {
        self.temperature = (self.temperature
            + rng.gen_range(-TEMPERATURE_STEP..=TEMPERATURE_STEP))
        .clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);

        self.humidity = (self.humidity + rng.gen_range(-HUMIDITY_STEP..=HUMIDITY_STEP))
            .clamp(MIN_HUMIDITY, MAX_HUMIDITY);

        Reading {
            device_id: self.id,
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }
}

impl Default for DeviceModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of a device's readings at one walk step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Identifier of the source device
    pub device_id: Uuid,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
}
