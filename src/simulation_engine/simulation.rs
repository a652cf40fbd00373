// simulation.rs
use crate::communication::messages::{EventSender, SimulationEvent};
use crate::config::SimulationConfig;
use crate::control_system::shutdown::shutdown_channel;
use crate::control_system::traffic_light_controller::TrafficLightController;
use crate::error::{SimResult, SimulationError};
use crate::simulation_engine::lanes::{Direction, LaneGates};
use crate::simulation_engine::vehicles::{Vehicle, VehicleRecord, VehicleTiming};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub vehicles: usize,
    /// Complete NS + EW light cycles the controller went through.
    pub cycles: u64,
    pub vehicles_per_direction: HashMap<Direction, usize>,
    pub average_wait: Duration,
    pub max_wait: Duration,
}

impl SimulationReport {
    fn from_records(records: &[VehicleRecord], cycles: u64) -> Self {
        let mut vehicles_per_direction = HashMap::new();
        for record in records {
            *vehicles_per_direction.entry(record.direction).or_insert(0) += 1;
        }
        let total_wait: u128 = records.iter().map(|r| r.waited.as_nanos()).sum();
        let average_wait = if records.is_empty() {
            Duration::ZERO
        } else {
            let average = total_wait / records.len() as u128;
            Duration::from_nanos(u64::try_from(average).unwrap_or(u64::MAX))
        };
        let max_wait = records
            .iter()
            .map(|r| r.waited)
            .max()
            .unwrap_or(Duration::ZERO);

        Self {
            vehicles: records.len(),
            cycles,
            vehicles_per_direction,
            average_wait,
            max_wait,
        }
    }
}

/// Joins every vehicle in spawn order.
///
/// On the first failed task the remaining vehicles are aborted and joined; their
/// lane permits are released as their futures drop.
async fn join_vehicles(vehicles: Vec<JoinHandle<VehicleRecord>>) -> SimResult<Vec<VehicleRecord>> {
    let mut records = Vec::with_capacity(vehicles.len());
    let mut pending = vehicles.into_iter();
    while let Some(handle) = pending.next() {
        match handle.await {
            Ok(record) => records.push(record),
            Err(e) => {
                log::error!("Vehicle task failed: {}", e);
                for rest in pending {
                    rest.abort();
                    if let Err(rest_err) = rest.await {
                        if !rest_err.is_cancelled() {
                            log::warn!("Vehicle task failed while aborting: {}", rest_err);
                        }
                    }
                }
                return Err(SimulationError::VehicleTask(e));
            }
        }
    }
    log::debug!("All {} vehicles joined, stopping controller", records.len());
    Ok(records)
}

/// Runs one simulation: a controller plus `vehicle_count` vehicle tasks.
///
/// The controller is only asked to stop once every vehicle has been joined, and
/// `AllVehiclesCleared` is sent after the controller itself has been joined.
pub async fn run_simulation(
    vehicle_count: usize,
    config: SimulationConfig,
    events: EventSender,
) -> SimResult<SimulationReport> {
    config.validate()?;
    config.check_vehicle_count(vehicle_count)?;

    let gates = Arc::new(LaneGates::new());
    let (shutdown, listener) = shutdown_channel();
    let controller = TrafficLightController::new(
        Arc::clone(&gates),
        config.clone(),
        events.clone(),
        listener,
    );
    let controller_handle = tokio::spawn(controller.run());

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let timing = VehicleTiming::from(&config);

    let mut vehicles = Vec::with_capacity(vehicle_count);
    for id in 1..=vehicle_count as u64 {
        let vehicle = Vehicle::new(id, rng.random());
        log::trace!("Spawning vehicle {} from {}", vehicle.id, vehicle.direction);
        vehicles.push(tokio::spawn(vehicle.journey(
            Arc::clone(&gates),
            timing,
            events.clone(),
            SmallRng::from_rng(&mut rng),
        )));
    }

    let joined = join_vehicles(vehicles).await;
    shutdown.trigger();
    let stopped = controller_handle.await;
    let records = match joined {
        Ok(records) => records,
        Err(e) => {
            if let Err(controller_err) = stopped {
                log::error!("Controller task failed during abort: {}", controller_err);
            }
            return Err(e);
        }
    };
    let cycles = stopped.map_err(SimulationError::ControllerTask)??;
    drop(gates);

    let report = SimulationReport::from_records(&records, cycles);
    log::info!(
        "{} vehicles cleared in {} cycles, average wait {:?}, max wait {:?}",
        report.vehicles,
        report.cycles,
        report.average_wait,
        report.max_wait
    );
    events.emit(SimulationEvent::AllVehiclesCleared {
        vehicles: report.vehicles,
    });
    Ok(report)
}
