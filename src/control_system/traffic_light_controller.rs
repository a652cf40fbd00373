use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::communication::messages::{EventSender, LightState, SimulationEvent};
use crate::config::SimulationConfig;
use crate::control_system::shutdown::ShutdownListener;
use crate::error::SimResult;
use crate::simulation_engine::lanes::{Axis, LaneGates};

/// The four controller states, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    NsGreen,
    NsYellow,
    EwGreen,
    EwYellow,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::NsGreen => Phase::NsYellow,
            Phase::NsYellow => Phase::EwGreen,
            Phase::EwGreen => Phase::EwYellow,
            Phase::EwYellow => Phase::NsGreen,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Phase::NsGreen | Phase::NsYellow => Axis::NorthSouth,
            Phase::EwGreen | Phase::EwYellow => Axis::EastWest,
        }
    }

    pub fn light(self) -> LightState {
        match self {
            Phase::NsGreen | Phase::EwGreen => LightState::Green,
            Phase::NsYellow | Phase::EwYellow => LightState::Yellow,
        }
    }

    /// How long the phase is held before moving on.
    pub fn hold(self, config: &SimulationConfig) -> Duration {
        match self.light() {
            LightState::Yellow => config.yellow(),
            _ => config.green(),
        }
    }
}

/// Drives the phase cycle and is the only writer of lane open/close transitions.
///
/// On a green phase both lanes of the axis are opened before the green event is
/// sent. Leaving a yellow phase closes them, which waits for any vehicle still
/// inside; the red event is sent only after that wait.
pub struct TrafficLightController {
    gates: Arc<LaneGates>,
    config: SimulationConfig,
    events: EventSender,
    shutdown: ShutdownListener,
}

impl TrafficLightController {
    pub fn new(
        gates: Arc<LaneGates>,
        config: SimulationConfig,
        events: EventSender,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            gates,
            config,
            events,
            shutdown,
        }
    }

    /// Cycles phases until shutdown is requested and returns the number of complete
    /// cycles (East-West red sent).
    ///
    /// Shutdown is only looked at while every lane is closed: before an axis opens
    /// and after its red. A stop requested mid-phase lets the axis finish its
    /// yellow, close and red first.
    pub async fn run(self) -> SimResult<u64> {
        let mut phase = Phase::NsGreen;
        let mut cycles = 0;

        while !self.shutdown.is_triggered() {
            debug_assert_eq!(phase.light(), LightState::Green);
            let green = self.gates.open_axis(phase.axis()).await?;
            let axis = green.axis();
            self.set_light(axis, LightState::Green);
            self.hold(phase).await;

            phase = phase.next();
            self.set_light(axis, LightState::Yellow);
            self.hold(phase).await;

            green.close().await;
            self.set_light(axis, LightState::Red);

            if axis == Axis::EastWest {
                cycles += 1;
            }
            phase = phase.next();
        }

        log::info!("Traffic light controller stopped after {} cycles", cycles);
        Ok(cycles)
    }

    fn set_light(&self, axis: Axis, light: LightState) {
        log::debug!("{:?} light for {}", light, axis);
        self.events.emit(SimulationEvent::LightChanged { axis, light });
    }

    async fn hold(&self, phase: Phase) {
        sleep(phase.hold(&self.config)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::messages::event_channel;
    use crate::control_system::shutdown::shutdown_channel;
    use crate::simulation_engine::lanes::Direction;
    use proptest::prelude::*;

    const CYCLE: [Phase; 4] = [
        Phase::NsGreen,
        Phase::NsYellow,
        Phase::EwGreen,
        Phase::EwYellow,
    ];

    fn lights(rx: &mut crate::communication::EventReceiver) -> Vec<(Axis, LightState)> {
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SimulationEvent::LightChanged { axis, light } = event {
                seen.push((axis, light));
            }
        }
        seen
    }

    #[test]
    fn phase_metadata() {
        assert_eq!(Phase::NsGreen.axis(), Axis::NorthSouth);
        assert_eq!(Phase::EwYellow.axis(), Axis::EastWest);
        assert_eq!(Phase::EwGreen.light(), LightState::Green);
        assert_eq!(Phase::NsYellow.light(), LightState::Yellow);

        let config = SimulationConfig::default();
        assert_eq!(Phase::NsGreen.hold(&config), config.green());
        assert_eq!(Phase::EwYellow.hold(&config), config.yellow());
    }

    proptest! {
        #[test]
        fn next_walks_the_cycle_in_order(start in 0usize..4, steps in 0usize..64) {
            let mut phase = CYCLE[start];
            for step in 1..=steps {
                phase = phase.next();
                prop_assert_eq!(phase, CYCLE[(start + step) % 4]);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_until_stopped() {
        let gates = Arc::new(LaneGates::new());
        let (events, mut rx) = event_channel();
        let (shutdown, listener) = shutdown_channel();
        let config = SimulationConfig::default();
        let controller = TrafficLightController::new(Arc::clone(&gates), config, events, listener);
        let handle = tokio::spawn(controller.run());

        // Two full cycles take 20s; stop a little after, during the third NS green.
        sleep(Duration::from_millis(20_500)).await;
        shutdown.trigger();
        let cycles = handle.await.unwrap().unwrap();
        assert_eq!(cycles, 2);

        let mut expected = Vec::new();
        for _ in 0..2 {
            for axis in [Axis::NorthSouth, Axis::EastWest] {
                for light in [LightState::Green, LightState::Yellow, LightState::Red] {
                    expected.push((axis, light));
                }
            }
        }
        // The interrupted axis still runs its yellow before turning red.
        for light in [LightState::Green, LightState::Yellow, LightState::Red] {
            expected.push((Axis::NorthSouth, light));
        }
        assert_eq!(lights(&mut rx), expected);
        assert!(gates.iter().all(|g| !g.is_open()));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_mid_green_keeps_full_hold_times() {
        let gates = Arc::new(LaneGates::new());
        let (events, mut rx) = event_channel();
        let (shutdown, listener) = shutdown_channel();
        let controller = TrafficLightController::new(
            Arc::clone(&gates),
            SimulationConfig::default(),
            events,
            listener,
        );
        let start = tokio::time::Instant::now();
        let handle = tokio::spawn(controller.run());

        sleep(Duration::from_secs(1)).await;
        shutdown.trigger();
        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(lights(&mut rx), vec![(Axis::NorthSouth, LightState::Green)]);
        assert!(gates.gate(Direction::South).is_open());

        let cycles = handle.await.unwrap().unwrap();
        assert_eq!(cycles, 0);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(
            lights(&mut rx),
            vec![
                (Axis::NorthSouth, LightState::Yellow),
                (Axis::NorthSouth, LightState::Red),
            ]
        );
        assert!(gates.iter().all(|g| !g.is_open()));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_emits_nothing() {
        let gates = Arc::new(LaneGates::new());
        let (events, mut rx) = event_channel();
        let (shutdown, listener) = shutdown_channel();
        shutdown.trigger();
        let controller =
            TrafficLightController::new(gates, SimulationConfig::default(), events, listener);
        assert_eq!(controller.run().await.unwrap(), 0);
        assert!(lights(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn red_waits_for_crossing_vehicle() {
        let gates = Arc::new(LaneGates::new());
        let (events, mut rx) = event_channel();
        let (shutdown, listener) = shutdown_channel();
        let controller = TrafficLightController::new(
            Arc::clone(&gates),
            SimulationConfig::default(),
            events,
            listener,
        );
        let handle = tokio::spawn(controller.run());

        // Enter North during the NS green and stay well past the yellow.
        let permit = gates.gate(Direction::North).acquire().await;
        sleep(Duration::from_secs(8)).await;
        assert_eq!(
            lights(&mut rx),
            vec![
                (Axis::NorthSouth, LightState::Green),
                (Axis::NorthSouth, LightState::Yellow),
            ]
        );
        assert!(!gates.gate(Direction::North).is_open());
        assert!(!gates.gate(Direction::East).is_open());

        drop(permit);
        sleep(Duration::from_millis(1)).await;
        assert_eq!(
            lights(&mut rx),
            vec![
                (Axis::NorthSouth, LightState::Red),
                (Axis::EastWest, LightState::Green),
            ]
        );

        shutdown.trigger();
        handle.await.unwrap().unwrap();
    }
}
