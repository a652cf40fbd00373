// console.rs
//
// Terminal rendering of the event stream.

use crate::communication::messages::{LightState, SimulationEvent};

const BRIGHT_GREEN: &str = "\x1b[0;92m";
const BRIGHT_YELLOW: &str = "\x1b[0;93m";
const RED: &str = "\x1b[0;31m";
const UNDERLINE: &str = "\x1b[0;4m";
const RESET: &str = "\x1b[0m";

/// Output style picked on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

pub fn banner(vehicle_count: usize) -> String {
    format!("{UNDERLINE}Traffic Light Simulation{RESET}\n\tVehicles: {vehicle_count}\n")
}

/// Console line for an event, or `None` for events that are only logged.
pub fn render_console(event: &SimulationEvent) -> Option<String> {
    match event {
        SimulationEvent::LightChanged { light, .. } => {
            let color = match light {
                LightState::Green => BRIGHT_GREEN,
                LightState::Yellow => BRIGHT_YELLOW,
                LightState::Red => RED,
            };
            Some(format!("{color}{event}{RESET}"))
        }
        SimulationEvent::VehicleDeparted { .. } => None,
        _ => Some(event.to_string()),
    }
}

pub fn render(event: &SimulationEvent, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Console => render_console(event),
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(line) => Some(line),
            Err(e) => {
                log::error!("Failed to serialize {:?}: {}", event, e);
                None
            }
        },
    }
}
