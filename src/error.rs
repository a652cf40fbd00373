use thiserror::Error;
use tokio::task::JoinError;

use crate::simulation_engine::lanes::Direction;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("vehicle count {count} is outside the accepted range [{min}, {max}]")]
    VehicleCountOutOfRange { count: usize, min: usize, max: usize },

    #[error("invalid simulation configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("malformed configuration file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("lane {0} is already open")]
    GateAlreadyOpen(Direction),

    #[error("vehicle task failed: {0}")]
    VehicleTask(#[source] JoinError),

    #[error("traffic light controller task failed: {0}")]
    ControllerTask(#[source] JoinError),
}

pub type SimResult<T> = Result<T, SimulationError>;
