use crate::error::{SimResult, SimulationError};
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Compass direction a vehicle approaches from. Each direction has exactly one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        };
        f.write_str(name)
    }
}

/// Uniform over the four directions, so `rng.random::<Direction>()` works.
impl Distribution<Direction> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Direction {
        Direction::ALL[rng.random_range(0..Direction::ALL.len())]
    }
}

/// A pair of opposing lanes that always turn green and red together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Axis {
    pub fn lanes(self) -> [Direction; 2] {
        match self {
            Axis::NorthSouth => [Direction::North, Direction::South],
            Axis::EastWest => [Direction::East, Direction::West],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::NorthSouth => f.write_str("North-South"),
            Axis::EastWest => f.write_str("East-West"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct GateState {
    open: bool,
    occupied: bool,
}

/// Binary permit guarding one lane's slot in the intersection.
///
/// The controller is the only caller of [`open`](LaneGate::open) and of
/// [`OpenLane::close`]; vehicles only [`acquire`](LaneGate::acquire) and release.
/// At most one vehicle holds the permit at any time, and once a close has started
/// no new vehicle can acquire until the lane is opened again.
///
/// Waiters are woken in no particular order.
#[derive(Debug)]
pub struct LaneGate {
    direction: Direction,
    state: Mutex<GateState>,
    changed: Notify,
}

impl LaneGate {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: Mutex::new(GateState::default()),
            changed: Notify::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn is_occupied(&self) -> bool {
        self.lock().occupied
    }

    /// Turns the lane green. The returned token is the only way to close it again,
    /// so every open is paired with exactly one close.
    pub fn open(&self) -> SimResult<OpenLane<'_>> {
        {
            let mut state = self.lock();
            if state.open {
                return Err(SimulationError::GateAlreadyOpen(self.direction));
            }
            state.open = true;
        }
        self.changed.notify_waiters();
        Ok(OpenLane { gate: self })
    }

    /// Waits until the lane is open and free, then takes it.
    pub async fn acquire(&self) -> LanePermit<'_> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.lock();
                if state.open && !state.occupied {
                    state.occupied = true;
                    return LanePermit { gate: self };
                }
            }
            notified.await;
        }
    }

    async fn close(&self) {
        let occupied = {
            let mut state = self.lock();
            state.open = false;
            state.occupied
        };
        if occupied {
            log::trace!("{} lane closing, waiting for the vehicle inside", self.direction);
        }
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            let occupied = self.lock().occupied;
            if !occupied {
                return;
            }
            notified.await;
        }
    }

    fn release(&self) {
        self.lock().occupied = false;
        self.changed.notify_waiters();
    }

    // The state is two flags that are always written together, so a poisoned
    // lock still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof that a lane is currently open. Closing consumes it.
#[must_use = "an open lane stays green until `close` is awaited"]
#[derive(Debug)]
pub struct OpenLane<'a> {
    gate: &'a LaneGate,
}

impl OpenLane<'_> {
    /// Stops new vehicles from entering and waits for the one inside, if any, to leave.
    pub async fn close(self) {
        self.gate.close().await;
    }
}

/// A vehicle's hold on its lane. Dropping it releases the lane.
#[must_use = "dropping the permit releases the lane immediately"]
#[derive(Debug)]
pub struct LanePermit<'a> {
    gate: &'a LaneGate,
}

impl LanePermit<'_> {
    pub fn direction(&self) -> Direction {
        self.gate.direction
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LanePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// The four lane gates of the intersection, indexed by [`Direction`].
#[derive(Debug)]
pub struct LaneGates {
    gates: [LaneGate; 4],
}

impl LaneGates {
    pub fn new() -> Self {
        Self {
            gates: Direction::ALL.map(LaneGate::new),
        }
    }

    pub fn gate(&self, direction: Direction) -> &LaneGate {
        &self.gates[direction.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaneGate> {
        self.gates.iter()
    }

    /// Opens both lanes of `axis`. If the second lane cannot be opened the first one
    /// is closed again before the error is returned.
    pub async fn open_axis(&self, axis: Axis) -> SimResult<AxisGreen<'_>> {
        let [first, second] = axis.lanes();
        let first = self.gate(first).open()?;
        match self.gate(second).open() {
            Ok(second) => Ok(AxisGreen {
                axis,
                lanes: [first, second],
            }),
            Err(e) => {
                first.close().await;
                Err(e)
            }
        }
    }
}

impl Default for LaneGates {
    fn default() -> Self {
        Self::new()
    }
}

/// Both lanes of an axis while its light is green or yellow.
#[must_use = "an axis stays green until `close` is awaited"]
#[derive(Debug)]
pub struct AxisGreen<'a> {
    axis: Axis,
    lanes: [OpenLane<'a>; 2],
}

impl AxisGreen<'_> {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Closes both lanes at once and returns when neither holds a vehicle.
    pub async fn close(self) {
        let [first, second] = self.lanes;
        tokio::join!(first.close(), second.close());
    }
}
