use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{Direction, environment::Environment};

/// Trait defining the behavior of a controller for the agent.
/// Controllers pick one direction per tick based on what the environment reports.
pub trait Agent {
    /// Short name used in logs and the harness title.
    fn name(&self) -> &'static str;

    /// Determines the direction to take this tick.
    /// `&mut self` allows the controller to keep state across ticks.
    fn decide(&mut self, env: &dyn Environment, tick: u64) -> Direction;
}

/// A baseline controller that picks uniformly among legal directions.
#[derive(Debug)]
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, env: &dyn Environment, _tick: u64) -> Direction {
        let legal = env.legal_directions(true);
        if legal.is_empty() {
            return env.current_heading();
        }
        legal[self.rng.random_range(0..legal.len())]
    }
}
