pub mod console;
pub mod messages;

pub use messages::{event_channel, EventReceiver, EventSender, LightState, SimulationEvent};
