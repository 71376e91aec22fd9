#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use pacman_policy_core::{Direction, GHOST_COUNT, GhostView, Node, environment::Environment};

/// Node where ghosts that have not left the lair sit.
pub const LAIR: Node = 900;

/// Hand-built environment: every fact the policy can query is set explicitly.
/// Unlisted node pairs are `default_distance` apart.
#[derive(Debug, Clone)]
pub struct ScriptedEnvironment {
    pub agent: Node,
    pub heading: Direction,
    pub legal: Vec<Direction>,
    pub neighbors: HashMap<(Node, Direction), Node>,
    pub distances: HashMap<(Node, Node), u32>,
    pub default_distance: u32,
    pub junctions: HashSet<Node>,
    pub pills: HashSet<Node>,
    pub power_pills: HashSet<Node>,
    pub power_pill_nodes: Vec<Node>,
    pub ghosts: [GhostView; GHOST_COUNT],
    pub towards: Direction,
}

pub fn in_lair() -> GhostView {
    GhostView {
        node: LAIR,
        edible: false,
        edible_time: 0,
        lair_time: 50,
    }
}

pub fn hunter(node: Node) -> GhostView {
    GhostView {
        node,
        edible: false,
        edible_time: 0,
        lair_time: 0,
    }
}

pub fn edible(node: Node, edible_time: u32) -> GhostView {
    GhostView {
        node,
        edible: true,
        edible_time,
        lair_time: 0,
    }
}

impl ScriptedEnvironment {
    pub fn new(agent: Node) -> Self {
        ScriptedEnvironment {
            agent,
            heading: Direction::Neutral,
            legal: Vec::new(),
            neighbors: HashMap::new(),
            distances: HashMap::new(),
            default_distance: 100,
            junctions: HashSet::new(),
            pills: HashSet::new(),
            power_pills: HashSet::new(),
            power_pill_nodes: Vec::new(),
            ghosts: [in_lair(); GHOST_COUNT],
            towards: Direction::Neutral,
        }
    }

    /// Adds a legal direction from the agent's node leading to `node`.
    pub fn exit(mut self, direction: Direction, node: Node) -> Self {
        self.legal.push(direction);
        self.neighbors.insert((self.agent, direction), node);
        self
    }

    /// Adds a legal direction the environment reports but cannot resolve to a node.
    pub fn blocked_exit(mut self, direction: Direction) -> Self {
        self.legal.push(direction);
        self
    }

    pub fn distance(mut self, a: Node, b: Node, distance: u32) -> Self {
        self.set_distance(a, b, distance);
        self
    }

    pub fn set_distance(&mut self, a: Node, b: Node, distance: u32) {
        self.distances.insert((a.min(b), a.max(b)), distance);
    }

    pub fn slot(mut self, slot: usize, ghost: GhostView) -> Self {
        self.ghosts[slot] = ghost;
        self
    }

    pub fn pill(mut self, node: Node) -> Self {
        self.pills.insert(node);
        self
    }

    pub fn power_pill(mut self, node: Node) -> Self {
        self.power_pills.insert(node);
        self.power_pill_nodes.push(node);
        self
    }

    pub fn junction(mut self, node: Node) -> Self {
        self.junctions.insert(node);
        self
    }

    pub fn towards(mut self, direction: Direction) -> Self {
        self.towards = direction;
        self
    }

    pub fn heading(mut self, direction: Direction) -> Self {
        self.heading = direction;
        self
    }

    /// Node the agent reaches by taking `direction`.
    pub fn next(&self, direction: Direction) -> Node {
        self.neighbors[&(self.agent, direction)]
    }
}

impl Environment for ScriptedEnvironment {
    fn current_agent_node(&self) -> Node {
        self.agent
    }

    fn legal_directions(&self, include_reversal: bool) -> Vec<Direction> {
        self.legal
            .iter()
            .copied()
            .filter(|d| include_reversal || *d != self.heading.opposite())
            .collect()
    }

    fn current_heading(&self) -> Direction {
        self.heading
    }

    fn neighbor(&self, node: Node, direction: Direction) -> Option<Node> {
        self.neighbors.get(&(node, direction)).copied()
    }

    fn path_distance(&self, a: Node, b: Node) -> u32 {
        if a == b {
            return 0;
        }
        self.distances
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(self.default_distance)
    }

    fn is_junction(&self, node: Node) -> bool {
        self.junctions.contains(&node)
    }

    fn has_pill(&self, node: Node) -> bool {
        self.pills.contains(&node)
    }

    fn has_power_pill(&self, node: Node) -> bool {
        self.power_pills.contains(&node)
    }

    fn power_pill_nodes(&self) -> Vec<Node> {
        self.power_pill_nodes.clone()
    }

    fn is_edible(&self, ghost: usize) -> bool {
        self.ghosts[ghost].edible
    }

    fn edible_time(&self, ghost: usize) -> u32 {
        self.ghosts[ghost].edible_time
    }

    fn lair_time(&self, ghost: usize) -> u32 {
        self.ghosts[ghost].lair_time
    }

    fn ghost_node(&self, ghost: usize) -> Node {
        self.ghosts[ghost].node
    }

    fn next_direction_towards(&self, _target: Node, _include_reversal: bool) -> Direction {
        self.towards
    }
}
