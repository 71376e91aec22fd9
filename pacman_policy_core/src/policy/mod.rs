use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Direction, GHOST_COUNT, GhostView,
    agent::Agent,
    config::PolicyConfig,
    environment::Environment,
};

pub mod lure;
pub mod scoring;
mod state;

pub use state::PolicyState;

/// Behaviour the policy used on a tick, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Hovering near a power pill while ghosts gather.
    Lure,
    /// Hunting edible ghosts.
    Chase,
    /// Running from a nearby dangerous ghost.
    Evade,
    /// Nothing pressing: keep the sticky heading or take the safest step.
    Cautious,
    /// No legal move, the current heading was passed through.
    Stalled,
}

/// Multi-mode heuristic controller.
///
/// Each tick it updates its power window bookkeeping, then takes the first
/// behaviour that applies: lure, chase, evade, cautious. Chasing and luring are
/// switched off once `max_consumed` captures were counted in the current window.
#[derive(Debug)]
pub struct DecisionPolicy<R = StdRng> {
    config: PolicyConfig,
    state: PolicyState,
    rng: R,
    last_mode: Option<Mode>,
}

impl DecisionPolicy<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_config(PolicyConfig::default(), seed)
    }

    pub fn with_config(config: PolicyConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DecisionPolicy<R> {
    /// Builds a policy around an existing random source, used for tie-break fallbacks.
    pub fn from_rng(config: PolicyConfig, rng: R) -> Self {
        Self {
            config,
            state: PolicyState::default(),
            rng,
            last_mode: None,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn state(&self) -> &PolicyState {
        &self.state
    }

    /// Mode chosen on the most recent tick.
    pub fn last_mode(&self) -> Option<Mode> {
        self.last_mode
    }

    fn safest_direction(
        &mut self,
        env: &dyn Environment,
        legal: &[Direction],
        ghosts: &[GhostView],
    ) -> Direction {
        let config = self.config;
        scoring::best_direction(env, legal, &mut self.rng, |node| {
            scoring::evade_score(env, node, ghosts, &config)
        })
    }

    /// Takes the first behaviour that applies.
    ///
    /// The cautious default keeps the sticky heading while it stays legal.
    /// Otherwise it takes the best evade-scored step, which is random only
    /// when no legal direction resolves to a node, and makes that the new
    /// sticky heading.
    fn choose(
        &mut self,
        env: &dyn Environment,
        legal: &[Direction],
        ghosts: &[GhostView],
    ) -> (Mode, Direction) {
        let config = self.config;
        let current = env.current_agent_node();

        if self.state.consumed_in_window < config.max_consumed {
            if let Some(target) = lure::lure_target(env, ghosts, &config) {
                let direction = lure::lure_direction(env, legal, target, ghosts, &config)
                    .unwrap_or_else(|| self.safest_direction(env, legal, ghosts));
                return (Mode::Lure, direction);
            }

            if ghosts.iter().any(|g| g.is_chaseable()) {
                let direction = scoring::best_direction(env, legal, &mut self.rng, |node| {
                    scoring::chase_score(env, node, ghosts, &config)
                });
                return (Mode::Chase, direction);
            }
        }

        if scoring::danger_near(env, current, ghosts, config.danger_distance) {
            self.state.last_heading = None;
            return (Mode::Evade, self.safest_direction(env, legal, ghosts));
        }

        if let Some(heading) = self.state.last_heading.filter(|h| legal.contains(h)) {
            return (Mode::Cautious, heading);
        }
        let direction = self.safest_direction(env, legal, ghosts);
        self.state.last_heading = Some(direction);
        (Mode::Cautious, direction)
    }
}

impl<R: Rng> Agent for DecisionPolicy<R> {
    fn name(&self) -> &'static str {
        "decision-policy"
    }

    fn decide(&mut self, env: &dyn Environment, tick: u64) -> Direction {
        let ghosts: [GhostView; GHOST_COUNT] = std::array::from_fn(|i| env.ghost(i));

        let was_capped = self.state.consumed_in_window >= self.config.max_consumed;
        self.state.observe(&ghosts, tick);
        if !was_capped && self.state.consumed_in_window >= self.config.max_consumed {
            info!(
                tick,
                consumed = self.state.consumed_in_window,
                "Capture cap reached, chasing off until the next power window"
            );
        }

        let legal = env.legal_directions(true);
        let (mode, direction) = if legal.is_empty() {
            (Mode::Stalled, env.current_heading())
        } else {
            self.choose(env, &legal, &ghosts)
        };

        debug!(tick, ?mode, ?direction, "Decision");
        self.last_mode = Some(mode);
        direction
    }
}
