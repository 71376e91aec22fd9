//! Position scoring for the evade, cautious and chase behaviours.
//!
//! Every function scores the node reached by one step; higher is better.

use rand::Rng;
use tracing::trace;

use crate::{Direction, GhostView, Node, config::PolicyConfig, environment::Environment};

pub const VERY_DANGEROUS_PENALTY: i64 = 1000;
pub const DANGER_PENALTY: i64 = 500;
/// Reward per step of distance from a dangerous ghost that is far enough away.
pub const DISTANCE_WEIGHT: i64 = 2;
pub const POWER_PILL_BONUS: i64 = 50;
/// Power pill bonus when a dangerous ghost is close to the pill.
pub const CONTESTED_POWER_PILL_BONUS: i64 = 100;
pub const PILL_BONUS: i64 = 20;
pub const JUNCTION_BONUS: i64 = 30;
/// Reward per step an edible ghost is inside the chase radius.
pub const CHASE_WEIGHT: i64 = 100;

/// True if a dangerous ghost is closer than `radius` to `node`.
pub fn danger_near(env: &dyn Environment, node: Node, ghosts: &[GhostView], radius: u32) -> bool {
    ghosts
        .iter()
        .filter(|g| !g.edible)
        .any(|g| env.path_distance(node, g.node) < radius)
}

/// Bonuses for what the tile offers: pills, power pills and escape routes.
pub fn tile_bonus(
    env: &dyn Environment,
    node: Node,
    ghosts: &[GhostView],
    config: &PolicyConfig,
) -> i64 {
    let mut score = 0;
    if env.has_power_pill(node) {
        score += if danger_near(env, node, ghosts, config.danger_distance) {
            CONTESTED_POWER_PILL_BONUS
        } else {
            POWER_PILL_BONUS
        };
    }
    if env.has_pill(node) {
        score += PILL_BONUS;
    }
    if env.is_junction(node) {
        score += JUNCTION_BONUS;
    }
    score
}

/// Safety score used while evading and when no other behaviour applies.
pub fn evade_score(
    env: &dyn Environment,
    node: Node,
    ghosts: &[GhostView],
    config: &PolicyConfig,
) -> i64 {
    let mut score = 0;
    for ghost in ghosts.iter().filter(|g| !g.edible) {
        let distance = env.path_distance(node, ghost.node);
        if distance < config.very_dangerous_distance {
            score -= VERY_DANGEROUS_PENALTY;
        } else if distance < config.danger_distance {
            score -= DANGER_PENALTY;
        } else {
            score += DISTANCE_WEIGHT * i64::from(distance);
        }
    }
    score + tile_bonus(env, node, ghosts, config)
}

/// Attraction towards edible ghosts. Falls back to tile bonuses when none is in range.
pub fn chase_score(
    env: &dyn Environment,
    node: Node,
    ghosts: &[GhostView],
    config: &PolicyConfig,
) -> i64 {
    let mut score = 0;
    let mut in_range = false;
    for ghost in ghosts.iter().filter(|g| g.is_chaseable()) {
        let distance = env.path_distance(node, ghost.node);
        if distance < config.chase_distance {
            score += i64::from(config.chase_distance - distance) * CHASE_WEIGHT;
            in_range = true;
        }
    }
    if !in_range {
        score += tile_bonus(env, node, ghosts, config);
    }
    score
}

/// Picks the legal direction whose next node scores highest.
///
/// Ties keep the first direction in `legal` order. Directions without a
/// neighbour are skipped; if none is left a random legal direction is returned.
/// With no legal direction at all the current heading passes through.
pub fn best_direction<R, F>(
    env: &dyn Environment,
    legal: &[Direction],
    rng: &mut R,
    mut score: F,
) -> Direction
where
    R: Rng,
    F: FnMut(Node) -> i64,
{
    if legal.is_empty() {
        return env.current_heading();
    }

    let current = env.current_agent_node();
    let mut best: Option<(Direction, i64)> = None;
    for &direction in legal {
        let Some(next) = env.neighbor(current, direction) else {
            continue;
        };
        let value = score(next);
        trace!(?direction, next, value, "Scored direction");
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((direction, value));
        }
    }

    match best {
        Some((direction, _)) => direction,
        None => legal[rng.random_range(0..legal.len())],
    }
}
