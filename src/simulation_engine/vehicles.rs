use crate::communication::messages::{EventSender, SimulationEvent};
use crate::config::SimulationConfig;
use crate::simulation_engine::lanes::{Direction, LaneGates};
use rand::rngs::SmallRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Represents a vehicle approaching the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle {
    pub id: u64,
    pub direction: Direction,
}

/// The slice of the configuration a vehicle needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleTiming {
    pub arrival: Duration,
    pub transit_base: Duration,
    pub transit_jitter: Duration,
}

impl From<&SimulationConfig> for VehicleTiming {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            arrival: config.arrival(),
            transit_base: config.transit_base(),
            transit_jitter: config.transit_jitter(),
        }
    }
}

impl VehicleTiming {
    /// Base crossing time plus a uniform jitter in `[0, transit_jitter]`.
    pub fn crossing_time(&self, rng: &mut impl Rng) -> Duration {
        let jitter_ms = rng.random_range(0..=self.transit_jitter.as_millis() as u64);
        self.transit_base + Duration::from_millis(jitter_ms)
    }
}

/// What a vehicle reports once it has left the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleRecord {
    pub id: u64,
    pub direction: Direction,
    /// Time between arriving at the stop line and entering the intersection.
    pub waited: Duration,
}

impl Vehicle {
    pub fn new(id: u64, direction: Direction) -> Self {
        Self { id, direction }
    }

    /// Arrive, wait for the lane, cross, leave. Meant to run as its own task.
    pub async fn journey(
        self,
        gates: Arc<LaneGates>,
        timing: VehicleTiming,
        events: EventSender,
        mut rng: SmallRng,
    ) -> VehicleRecord {
        sleep(timing.arrival).await;
        events.emit(SimulationEvent::VehicleApproaching {
            vehicle_id: self.id,
            direction: self.direction,
        });

        let arrived = Instant::now();
        let permit = gates.gate(self.direction).acquire().await;
        let waited = arrived.elapsed();
        log::trace!(
            "Vehicle {} entered the {} lane after {:?}",
            self.id,
            permit.direction(),
            waited
        );
        events.emit(SimulationEvent::VehicleCrossing {
            vehicle_id: self.id,
            direction: self.direction,
        });

        sleep(timing.crossing_time(&mut rng)).await;

        events.emit(SimulationEvent::VehicleDeparted {
            vehicle_id: self.id,
            direction: self.direction,
        });
        permit.release();

        VehicleRecord {
            id: self.id,
            direction: self.direction,
            waited,
        }
    }
}
