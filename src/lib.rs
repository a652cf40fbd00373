//! Four-way intersection simulation.
//!
//! A single [`TrafficLightController`](control_system::traffic_light_controller::TrafficLightController)
//! cycles the light phases while short-lived vehicle tasks wait on their lane's
//! [`LaneGate`](simulation_engine::lanes::LaneGate), cross, and leave. The two sides
//! only ever meet through the four gates.

pub mod cli;
pub mod communication;
pub mod config;
pub mod control_system;
pub mod error;
pub mod simulation_engine;

pub use config::SimulationConfig;
pub use error::{SimResult, SimulationError};
pub use simulation_engine::simulation::{run_simulation, SimulationReport};
