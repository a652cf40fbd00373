pub mod shutdown;
pub mod traffic_light_controller;

pub use shutdown::{shutdown_channel, Shutdown, ShutdownListener};
pub use traffic_light_controller::{Phase, TrafficLightController};
