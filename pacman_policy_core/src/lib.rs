use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod environment;
pub mod map;
pub mod policy;

/// Opaque handle for a maze location. Only compared for equality or handed back to the environment.
pub type Node = usize;

/// Number of ghost slots in every match.
pub const GHOST_COUNT: usize = 4;

/// Represents a 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

/// Movement choices for the agent.
///
/// `Neutral` is the "no movement possible" sentinel. It is never reported as a
/// legal direction, but may come back as the current heading before the first move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    Neutral,
}

impl Direction {
    /// The four movement directions, in the order environments report them.
    pub const MOVES: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns the reversal of this direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Neutral => Direction::Neutral,
        }
    }

    /// Grid offset for one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Neutral => (0, 0),
        }
    }
}

/// Snapshot of one ghost slot for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostView {
    pub node: Node,
    pub edible: bool,
    /// Ticks until the ghost turns dangerous again, 0 if not edible.
    pub edible_time: u32,
    /// Ticks until the ghost leaves the lair, 0 if already roaming.
    pub lair_time: u32,
}

impl GhostView {
    /// A ghost that has left the lair.
    pub fn is_active(&self) -> bool {
        self.lair_time == 0
    }

    /// Edible with time left on the clock.
    pub fn is_chaseable(&self) -> bool {
        self.edible && self.edible_time > 0
    }
}
