//! Luring: hover near an uneaten power pill until enough ghosts gather, then take it.

use tracing::{debug, warn};

use crate::{Direction, GhostView, Node, config::PolicyConfig, environment::Environment};

pub const ACTIVATION_WEIGHT: i64 = 100;
pub const LURE_WEIGHT: i64 = 50;
pub const JUNCTION_BONUS: i64 = 30;
pub const CLOSE_GHOST_PENALTY: i64 = 500;
/// Penalty for a close ghost once the agent is already beside the pill.
pub const CLOSE_GHOST_PENALTY_AT_PILL: i64 = 250;

/// The power pill the agent is hovering around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LureTarget {
    pub pill: Node,
    /// Path distance from the agent to the pill.
    pub distance: u32,
}

/// Nearest power pill still on the board, by path distance from `from`.
pub fn nearest_power_pill(env: &dyn Environment, from: Node) -> Option<LureTarget> {
    let mut nearest: Option<LureTarget> = None;
    for pill in env.power_pill_nodes() {
        if !env.has_power_pill(pill) {
            continue;
        }
        let distance = env.path_distance(from, pill);
        if nearest.is_none_or(|n| distance < n.distance) {
            nearest = Some(LureTarget { pill, distance });
        }
    }
    nearest
}

/// Dangerous ghosts out of the lair.
fn hunters(ghosts: &[GhostView]) -> impl Iterator<Item = &GhostView> {
    ghosts.iter().filter(|g| g.is_active() && !g.edible)
}

/// Number of dangerous roaming ghosts closer than `radius` to `node`.
pub fn hunters_within(
    env: &dyn Environment,
    node: Node,
    ghosts: &[GhostView],
    radius: u32,
) -> usize {
    hunters(ghosts)
        .filter(|g| env.path_distance(node, g.node) < radius)
        .count()
}

/// Returns the pill to lure around, if luring applies this tick.
///
/// Needs two ghosts out of the lair, a power pill close to the agent, and two
/// dangerous ghosts close to that pill.
pub fn lure_target(
    env: &dyn Environment,
    ghosts: &[GhostView],
    config: &PolicyConfig,
) -> Option<LureTarget> {
    if ghosts.iter().filter(|g| g.is_active()).count() < 2 {
        return None;
    }
    let target = nearest_power_pill(env, env.current_agent_node())?;
    if target.distance >= config.lure_distance {
        return None;
    }
    if hunters_within(env, target.pill, ghosts, config.lure_distance) < 2 {
        return None;
    }
    Some(target)
}

/// Direction for this tick while luring around `target`.
///
/// Returns `None` when no legal step keeps the agent in range of the pill; the
/// caller then falls back to plain evasion.
pub fn lure_direction(
    env: &dyn Environment,
    legal: &[Direction],
    target: LureTarget,
    ghosts: &[GhostView],
    config: &PolicyConfig,
) -> Option<Direction> {
    let gathered = hunters_within(env, target.pill, ghosts, config.power_pill_activation);
    let at_pill = target.distance <= config.lure_commit_distance;

    if gathered >= 2 && at_pill {
        let direction = env.next_direction_towards(target.pill, true);
        if legal.contains(&direction) {
            debug!(pill = target.pill, gathered, ?direction, "Committing to power pill");
            return Some(direction);
        }
        warn!(?direction, "Path to power pill is not a legal move, loitering instead");
    }

    // With a ghost already at the pill, stay right next to it.
    let tight = gathered >= 1;
    let current = env.current_agent_node();
    let penalty = if at_pill {
        CLOSE_GHOST_PENALTY_AT_PILL
    } else {
        CLOSE_GHOST_PENALTY
    };

    let mut best: Option<(Direction, i64)> = None;
    for &direction in legal {
        let Some(next) = env.neighbor(current, direction) else {
            continue;
        };
        let to_pill = env.path_distance(next, target.pill);
        let in_range = if tight {
            to_pill <= config.lure_commit_distance
        } else {
            to_pill < config.lure_distance
        };
        if !in_range {
            continue;
        }

        let mut score = 0;
        for ghost in hunters(ghosts) {
            let distance = env.path_distance(next, ghost.node);
            if distance < config.power_pill_activation {
                score += ACTIVATION_WEIGHT;
            }
            if distance < config.lure_distance {
                score += LURE_WEIGHT;
            }
            if distance < config.very_dangerous_distance {
                score -= penalty;
            }
        }
        if env.is_junction(next) {
            score += JUNCTION_BONUS;
        }

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((direction, score));
        }
    }

    best.map(|(direction, _)| direction)
}
