use crate::simulation_engine::lanes::{Axis, Direction};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

/// Everything the core reports while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    LightChanged {
        axis: Axis,
        light: LightState,
    },
    VehicleApproaching {
        vehicle_id: u64,
        direction: Direction,
    },
    VehicleCrossing {
        vehicle_id: u64,
        direction: Direction,
    },
    /// Sent while the vehicle still holds its lane, right before releasing it.
    VehicleDeparted {
        vehicle_id: u64,
        direction: Direction,
    },
    AllVehiclesCleared {
        vehicles: usize,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::LightChanged { axis, light } => {
                let color = match light {
                    LightState::Green => "Green",
                    LightState::Yellow => "Yellow",
                    LightState::Red => "Red",
                };
                write!(f, "{color} light for {axis}")
            }
            SimulationEvent::VehicleApproaching { direction, .. } => {
                write!(f, "\u{2195} Vehicle approaching from {direction}")
            }
            SimulationEvent::VehicleCrossing { direction, .. } => {
                write!(f, "\u{2194} Vehicle passing through from {direction}")
            }
            SimulationEvent::VehicleDeparted { direction, .. } => {
                write!(f, "Vehicle cleared the intersection from {direction}")
            }
            SimulationEvent::AllVehiclesCleared { .. } => {
                f.write_str("All vehicles successfully passed through the intersection.")
            }
        }
    }
}

pub type EventReceiver = mpsc::UnboundedReceiver<SimulationEvent>;

/// Cloneable handle the controller, the vehicles and the harness publish through.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SimulationEvent>,
}

pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

impl EventSender {
    /// Publishes an event. A closed receiver is logged, never turned into a failure
    /// of the agent that emitted it.
    pub fn emit(&self, event: SimulationEvent) {
        log::trace!("{:?}", event);
        if let Err(e) = self.tx.send(event) {
            log::warn!("Event receiver dropped, discarding: {}", e.0);
        }
    }
}
