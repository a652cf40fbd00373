// config.rs

use crate::error::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_GREEN_MS: u64 = 4_000;
pub const DEFAULT_YELLOW_MS: u64 = 1_000;
pub const DEFAULT_ARRIVAL_MS: u64 = 2_000;
pub const DEFAULT_TRANSIT_BASE_MS: u64 = 1_000;
pub const DEFAULT_TRANSIT_JITTER_MS: u64 = 5;
pub const DEFAULT_MIN_VEHICLES: usize = 10;
pub const DEFAULT_MAX_VEHICLES: usize = 500;

/// Timings and limits shared by the controller, the vehicles and the harness.
///
/// All durations are in milliseconds. Every field falls back to its default when
/// missing from a JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// How long an axis stays green.
    pub green_ms: u64,
    /// How long an axis stays yellow before its lanes are closed.
    pub yellow_ms: u64,
    /// Delay between a vehicle being spawned and it reaching the stop line.
    pub arrival_ms: u64,
    /// Fixed part of the time a vehicle spends in the intersection.
    pub transit_base_ms: u64,
    /// Upper bound of the random extra crossing time.
    pub transit_jitter_ms: u64,
    pub min_vehicles: usize,
    pub max_vehicles: usize,
    /// Seed for direction assignment and crossing jitter. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            green_ms: DEFAULT_GREEN_MS,
            yellow_ms: DEFAULT_YELLOW_MS,
            arrival_ms: DEFAULT_ARRIVAL_MS,
            transit_base_ms: DEFAULT_TRANSIT_BASE_MS,
            transit_jitter_ms: DEFAULT_TRANSIT_JITTER_MS,
            min_vehicles: DEFAULT_MIN_VEHICLES,
            max_vehicles: DEFAULT_MAX_VEHICLES,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Loads a config from a JSON file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.min_vehicles == 0 {
            return Err(SimulationError::InvalidConfig(
                "min_vehicles must be at least 1".to_string(),
            ));
        }
        if self.min_vehicles > self.max_vehicles {
            return Err(SimulationError::InvalidConfig(format!(
                "min_vehicles ({}) is greater than max_vehicles ({})",
                self.min_vehicles, self.max_vehicles
            )));
        }
        // A zero green phase would let the controller spin without ever yielding.
        if self.green_ms == 0 {
            return Err(SimulationError::InvalidConfig(
                "green_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn check_vehicle_count(&self, count: usize) -> SimResult<()> {
        if (self.min_vehicles..=self.max_vehicles).contains(&count) {
            Ok(())
        } else {
            Err(SimulationError::VehicleCountOutOfRange {
                count,
                min: self.min_vehicles,
                max: self.max_vehicles,
            })
        }
    }

    pub fn green(&self) -> Duration {
        Duration::from_millis(self.green_ms)
    }

    pub fn yellow(&self) -> Duration {
        Duration::from_millis(self.yellow_ms)
    }

    pub fn arrival(&self) -> Duration {
        Duration::from_millis(self.arrival_ms)
    }

    pub fn transit_base(&self) -> Duration {
        Duration::from_millis(self.transit_base_ms)
    }

    pub fn transit_jitter(&self) -> Duration {
        Duration::from_millis(self.transit_jitter_ms)
    }
}
