//! Whatever the snapshot, the policy answers with a legal direction, or with
//! the current heading when nothing is legal.

mod common;

use common::ScriptedEnvironment;
use pacman_policy_core::{Direction, GhostView, agent::Agent, policy::DecisionPolicy};
use proptest::prelude::*;

const NODES: usize = 12;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Right),
        Just(Direction::Down),
        Just(Direction::Left),
    ]
}

fn ghost() -> impl Strategy<Value = GhostView> {
    (0..NODES, any::<bool>(), 0u32..20, prop_oneof![Just(0u32), 1u32..30]).prop_map(
        |(node, edible, edible_time, lair_time)| GhostView {
            node,
            edible,
            edible_time: if edible { edible_time } else { 0 },
            lair_time,
        },
    )
}

prop_compose! {
    fn snapshot()(
        agent in 0..NODES,
        heading in prop_oneof![direction(), Just(Direction::Neutral)],
        exits in proptest::collection::vec((direction(), proptest::option::of(0..NODES)), 0..4),
        distances in proptest::collection::vec(0u32..40, NODES * NODES),
        power_pills in proptest::collection::vec((0..NODES, any::<bool>()), 0..3),
        pills in proptest::collection::vec(0..NODES, 0..6),
        junctions in proptest::collection::vec(0..NODES, 0..4),
        ghosts in proptest::array::uniform4(ghost()),
        towards in direction(),
    ) -> ScriptedEnvironment {
        let mut env = ScriptedEnvironment::new(agent).heading(heading).towards(towards);
        for (direction, node) in exits {
            if env.legal.contains(&direction) {
                continue;
            }
            env = match node {
                Some(node) => env.exit(direction, node),
                None => env.blocked_exit(direction),
            };
        }
        for a in 0..NODES {
            for b in a + 1..NODES {
                env.set_distance(a, b, distances[a * NODES + b]);
            }
        }
        for (node, present) in power_pills {
            env = env.power_pill(node);
            if !present {
                env.power_pills.remove(&node);
            }
        }
        for node in pills {
            env = env.pill(node);
        }
        for node in junctions {
            env = env.junction(node);
        }
        env.ghosts = ghosts;
        env
    }
}

proptest! {
    #[test]
    fn decision_is_always_legal(
        seed in any::<u64>(),
        ticks in proptest::collection::vec(snapshot(), 1..8),
    ) {
        let mut policy = DecisionPolicy::new(seed);
        for (tick, env) in ticks.iter().enumerate() {
            let direction = policy.decide(env, tick as u64);
            if env.legal.is_empty() {
                prop_assert_eq!(direction, env.heading);
            } else {
                prop_assert!(
                    env.legal.contains(&direction),
                    "{:?} not in {:?}",
                    direction,
                    env.legal
                );
            }
        }
    }
}
