use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Direction, GhostView};

/// Temporal state a [`DecisionPolicy`](super::DecisionPolicy) carries from one tick to the next.
///
/// Lives for one match. Only the owning policy mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyState {
    pub(crate) last_heading: Option<Direction>,
    pub(crate) consumed_in_window: u32,
    pub(crate) power_window_open: bool,
}

impl PolicyState {
    /// Sticky heading chosen by the cautious behaviour, cleared on evasion.
    pub fn last_heading(&self) -> Option<Direction> {
        self.last_heading
    }

    /// Captures counted since the current power window opened.
    pub fn consumed_in_window(&self) -> u32 {
        self.consumed_in_window
    }

    /// Whether at least one ghost was edible on the last observed tick.
    pub fn power_window_open(&self) -> bool {
        self.power_window_open
    }

    /// Updates the power window bookkeeping from this tick's ghosts.
    ///
    /// The counter resets when the window opens and grows by at most one per
    /// tick while fewer ghosts are edible than are out of the lair. Two captures
    /// on the same tick are counted once.
    pub(crate) fn observe(&mut self, ghosts: &[GhostView], tick: u64) {
        let edible = ghosts.iter().filter(|g| g.edible).count();
        let active = ghosts.iter().filter(|g| g.is_active()).count();
        let open = edible > 0;

        if open && !self.power_window_open {
            info!(tick, edible, "Power window opened");
            self.consumed_in_window = 0;
        }
        if open && edible < active {
            self.consumed_in_window += 1;
        }
        self.power_window_open = open;
    }
}
