use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Direction, GHOST_COUNT, GhostView, Node,
    agent::Agent,
    map::{Maze, Tile},
};

/// Read-only queries a controller may make about the current tick.
///
/// Implementations answer from the live game state. Controllers never mutate it.
pub trait Environment {
    fn current_agent_node(&self) -> Node;

    /// Directions the agent may take from its node, in a stable order.
    /// With `include_reversal == false` the reversal of the current heading is left out.
    fn legal_directions(&self, include_reversal: bool) -> Vec<Direction>;

    fn current_heading(&self) -> Direction;

    /// Node one step away, or `None` if the move is blocked.
    fn neighbor(&self, node: Node, direction: Direction) -> Option<Node>;

    fn path_distance(&self, a: Node, b: Node) -> u32;

    /// A node with three or more exits.
    fn is_junction(&self, node: Node) -> bool;

    fn has_pill(&self, node: Node) -> bool;

    fn has_power_pill(&self, node: Node) -> bool;

    /// Every power pill location of the level, eaten or not.
    fn power_pill_nodes(&self) -> Vec<Node>;

    fn is_edible(&self, ghost: usize) -> bool;

    fn edible_time(&self, ghost: usize) -> u32;

    fn lair_time(&self, ghost: usize) -> u32;

    fn ghost_node(&self, ghost: usize) -> Node;

    /// First step along the shortest path to `target`.
    fn next_direction_towards(&self, target: Node, include_reversal: bool) -> Direction;

    fn ghost(&self, ghost: usize) -> GhostView {
        GhostView {
            node: self.ghost_node(ghost),
            edible: self.is_edible(ghost),
            edible_time: self.edible_time(ghost),
            lair_time: self.lair_time(ghost),
        }
    }
}

/// Ticks a ghost stays edible after a power pill.
pub const EDIBLE_TIME: u32 = 40;
/// Ticks an eaten ghost waits in the lair.
pub const LAIR_TIME: u32 = 20;
/// Ticks between successive ghosts leaving the lair at the start of a life.
pub const LAIR_RELEASE_STEP: u32 = 15;
pub const STARTING_LIVES: u32 = 3;

const PILL_SCORE: u32 = 10;
const POWER_PILL_SCORE: u32 = 50;
const GHOST_SCORE: u32 = 200;
/// Chance that a dangerous ghost takes the step towards the agent instead of wandering.
const GHOST_AGGRESSION: f64 = 0.8;

/// Represents the outcome of processing one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    Continue,
    LifeLost,
    LevelCleared,
    GameOver,
}

/// Holds the state of one ghost within the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostState {
    pub node: Node,
    pub heading: Direction,
    pub edible_time: u32,
    pub lair_time: u32,
}

impl GhostState {
    fn in_lair(node: Node, lair_time: u32) -> Self {
        GhostState {
            node,
            heading: Direction::Neutral,
            edible_time: 0,
            lair_time,
        }
    }

    pub fn is_edible(&self) -> bool {
        self.edible_time > 0
    }

    pub fn is_roaming(&self) -> bool {
        self.lair_time == 0
    }
}

/// A reference turn-based simulation of one level.
///
/// The agent moves first each turn, then the ghosts. Collisions are checked
/// after both halves of the turn.
pub struct Game {
    maze: Maze,
    agent_node: Node,
    heading: Direction,
    pills: Vec<bool>,
    power_pills: Vec<bool>,
    power_pill_nodes: Vec<Node>,
    ghosts: [GhostState; GHOST_COUNT],
    captures_in_window: u32,
    score: u32,
    lives: u32,
    tick: u64,
    rng: StdRng,
}

impl Game {
    /// Creates a new game on the given maze. `seed` drives ghost movement.
    pub fn new(maze: Maze, seed: u64) -> Self {
        let count = maze.node_count();
        let mut pills = vec![false; count];
        let mut power_pills = vec![false; count];
        for node in maze.nodes_with(Tile::Pill) {
            pills[node] = true;
        }
        let power_pill_nodes = maze.nodes_with(Tile::PowerPill);
        for node in &power_pill_nodes {
            power_pills[*node] = true;
        }

        let ghosts = Self::ghosts_at_start(&maze);
        Game {
            agent_node: maze.agent_start(),
            heading: Direction::Neutral,
            pills,
            power_pills,
            power_pill_nodes,
            ghosts,
            captures_in_window: 0,
            score: 0,
            lives: STARTING_LIVES,
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
            maze,
        }
    }

    fn ghosts_at_start(maze: &Maze) -> [GhostState; GHOST_COUNT] {
        let lair = maze.lair_nodes();
        std::array::from_fn(|i| {
            GhostState::in_lair(lair[i % lair.len()], i as u32 * LAIR_RELEASE_STEP)
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn ghosts(&self) -> &[GhostState; GHOST_COUNT] {
        &self.ghosts
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn pills_remaining(&self) -> usize {
        self.pills.iter().chain(self.power_pills.iter()).filter(|p| **p).count()
    }

    /// Processes one turn: the agent decides and moves, then the ghosts move.
    pub fn process_turn(&mut self, agent: &mut dyn Agent) -> TurnOutcome {
        if self.lives == 0 {
            return TurnOutcome::GameOver;
        }
        if self.pills_remaining() == 0 {
            return TurnOutcome::LevelCleared;
        }

        let direction = agent.decide(&*self, self.tick);
        if let Some(next) = self.neighbor(self.agent_node, direction) {
            self.agent_node = next;
            self.heading = direction;
            self.eat(next);
        }

        let outcome = match self.resolve_collisions() {
            TurnOutcome::Continue => {
                self.move_ghosts();
                self.resolve_collisions()
            }
            other => other,
        };

        self.tick += 1;
        if outcome == TurnOutcome::Continue && self.pills_remaining() == 0 {
            info!(tick = self.tick, score = self.score, "Level cleared");
            return TurnOutcome::LevelCleared;
        }
        outcome
    }

    fn eat(&mut self, node: Node) {
        if self.pills[node] {
            self.pills[node] = false;
            self.score += PILL_SCORE;
        }
        if self.power_pills[node] {
            self.power_pills[node] = false;
            self.score += POWER_PILL_SCORE;
            self.captures_in_window = 0;
            for ghost in self.ghosts.iter_mut().filter(|g| g.is_roaming()) {
                ghost.edible_time = EDIBLE_TIME;
                ghost.heading = ghost.heading.opposite();
            }
            debug!(tick = self.tick, node, "Power pill eaten");
        }
    }

    fn resolve_collisions(&mut self) -> TurnOutcome {
        for i in 0..GHOST_COUNT {
            let ghost = &self.ghosts[i];
            if !ghost.is_roaming() || ghost.node != self.agent_node {
                continue;
            }

            if ghost.is_edible() {
                self.score += GHOST_SCORE << self.captures_in_window.min(3);
                self.captures_in_window += 1;
                let lair = self.maze.lair_nodes()[i % self.maze.lair_nodes().len()];
                self.ghosts[i] = GhostState::in_lair(lair, LAIR_TIME);
                debug!(tick = self.tick, ghost = i, "Ghost captured");
            } else {
                self.lives -= 1;
                info!(tick = self.tick, ghost = i, lives = self.lives, "Life lost");
                if self.lives == 0 {
                    return TurnOutcome::GameOver;
                }
                self.agent_node = self.maze.agent_start();
                self.heading = Direction::Neutral;
                self.ghosts = Self::ghosts_at_start(&self.maze);
                return TurnOutcome::LifeLost;
            }
        }
        TurnOutcome::Continue
    }

    fn move_ghosts(&mut self) {
        for i in 0..GHOST_COUNT {
            if self.ghosts[i].lair_time > 0 {
                self.ghosts[i].lair_time -= 1;
                continue;
            }

            let ghost = &self.ghosts[i];
            // No reversals unless the ghost is in a dead end.
            let mut options: Vec<(Direction, Node)> = Direction::MOVES
                .iter()
                .filter(|d| **d != ghost.heading.opposite())
                .filter_map(|d| self.maze.neighbour(ghost.node, *d).map(|n| (*d, n)))
                .collect();
            if options.is_empty() {
                options = Direction::MOVES
                    .iter()
                    .filter_map(|d| self.maze.neighbour(ghost.node, *d).map(|n| (*d, n)))
                    .collect();
            }
            if options.is_empty() {
                continue;
            }

            let edible = ghost.is_edible();
            // Edible ghosts crawl at half speed.
            if edible && self.tick % 2 == 1 {
                self.ghosts[i].edible_time -= 1;
                continue;
            }

            let (direction, node) = if edible {
                *options
                    .iter()
                    .max_by_key(|(_, n)| self.maze.distance(*n, self.agent_node))
                    .unwrap_or(&options[0])
            } else if self.rng.random_bool(GHOST_AGGRESSION) {
                *options
                    .iter()
                    .min_by_key(|(_, n)| self.maze.distance(*n, self.agent_node))
                    .unwrap_or(&options[0])
            } else {
                options[self.rng.random_range(0..options.len())]
            };

            let ghost = &mut self.ghosts[i];
            ghost.node = node;
            ghost.heading = direction;
            ghost.edible_time = ghost.edible_time.saturating_sub(1);
        }
    }
}

impl Environment for Game {
    fn current_agent_node(&self) -> Node {
        self.agent_node
    }

    fn legal_directions(&self, include_reversal: bool) -> Vec<Direction> {
        Direction::MOVES
            .into_iter()
            .filter(|d| include_reversal || *d != self.heading.opposite())
            .filter(|d| self.maze.agent_neighbour(self.agent_node, *d).is_some())
            .collect()
    }

    fn current_heading(&self) -> Direction {
        self.heading
    }

    fn neighbor(&self, node: Node, direction: Direction) -> Option<Node> {
        self.maze.agent_neighbour(node, direction)
    }

    fn path_distance(&self, a: Node, b: Node) -> u32 {
        self.maze.distance(a, b)
    }

    fn is_junction(&self, node: Node) -> bool {
        Direction::MOVES
            .iter()
            .filter(|d| self.maze.agent_neighbour(node, **d).is_some())
            .count()
            >= 3
    }

    fn has_pill(&self, node: Node) -> bool {
        self.pills.get(node).copied().unwrap_or(false)
    }

    fn has_power_pill(&self, node: Node) -> bool {
        self.power_pills.get(node).copied().unwrap_or(false)
    }

    fn power_pill_nodes(&self) -> Vec<Node> {
        self.power_pill_nodes.clone()
    }

    fn is_edible(&self, ghost: usize) -> bool {
        self.ghosts[ghost].is_edible()
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

    fn next_direction_towards(&self, target: Node, include_reversal: bool) -> Direction {
        let mut best = (Direction::Neutral, u32::MAX);
        for direction in self.legal_directions(include_reversal) {
            if let Some(next) = self.neighbor(self.agent_node, direction) {
                let distance = self.maze.distance(next, target);
                if distance < best.1 {
                    best = (direction, distance);
                }
            }
        }
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    const LAYOUT: &str = "\
#########
#o.....o#
#.##.##.#
#...P...#
#.##G##.#
#.......#
#########";

    /// Replays a fixed list of directions, then stands still.
    struct Scripted(Vec<Direction>);

    impl Agent for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn decide(&mut self, _env: &dyn Environment, _tick: u64) -> Direction {
            if self.0.is_empty() {
                Direction::Neutral
            } else {
                self.0.remove(0)
            }
        }
    }

    fn game() -> Game {
        Game::new(Maze::parse(LAYOUT).unwrap(), 7)
    }

    fn node(game: &Game, x: usize, y: usize) -> Node {
        game.maze().node_at(Position { x, y }).unwrap()
    }

    #[test]
    fn legal_directions_exclude_walls_and_lair() {
        let game = game();
        // Start at (4, 3): left and right open, up open, down is the lair.
        assert_eq!(
            game.legal_directions(true),
            vec![Direction::Up, Direction::Right, Direction::Left]
        );
        assert!(game.is_junction(game.current_agent_node()));
    }

    #[test]
    fn reversal_is_filtered_on_request() {
        let mut game = game();
        game.process_turn(&mut Scripted(vec![Direction::Right]));

        assert_eq!(game.current_heading(), Direction::Right);
        assert!(!game.legal_directions(false).contains(&Direction::Left));
        assert!(game.legal_directions(true).contains(&Direction::Left));
    }

    #[test]
    fn eating_pills_scores_and_clears_tiles() {
        let mut game = game();
        let before = game.pills_remaining();
        let target = node(&game, 5, 3);

        assert!(game.has_pill(target));
        game.process_turn(&mut Scripted(vec![Direction::Right]));

        assert_eq!(game.current_agent_node(), target);
        assert!(!game.has_pill(target));
        assert_eq!(game.score(), PILL_SCORE);
        assert_eq!(game.pills_remaining(), before - 1);
    }

    #[test]
    fn power_pill_makes_roaming_ghosts_edible() {
        let mut game = game();
        // Ghost 0 leaves the lair immediately; walk to the top-left power pill.
        let path = vec![
            Direction::Left,
            Direction::Left,
            Direction::Left,
            Direction::Up,
            Direction::Up,
        ];
        let mut agent = Scripted(path);
        let mut ate_power_pill = false;
        for _ in 0..5 {
            let outcome = game.process_turn(&mut agent);
            if outcome != TurnOutcome::Continue {
                break;
            }
            if game.current_agent_node() == node(&game, 1, 1) {
                ate_power_pill = true;
                break;
            }
        }

        if ate_power_pill {
            assert!(!game.has_power_pill(node(&game, 1, 1)));
            assert!(game.power_pill_nodes().contains(&node(&game, 1, 1)));
            // Ghost 0 is either still edible or was caught and sent home.
            assert!(game.is_edible(0) || game.lair_time(0) > 0);
            assert!(!game.is_edible(3));
            assert!(game.lair_time(3) > 0);
        } else {
            // The roaming ghost caught the agent first.
            assert!(game.lives() < STARTING_LIVES);
        }
    }

    #[test]
    fn next_direction_towards_follows_shortest_path() {
        let game = game();
        let east = node(&game, 7, 3);
        assert_eq!(game.next_direction_towards(east, true), Direction::Right);
        let west = node(&game, 1, 3);
        assert_eq!(game.next_direction_towards(west, true), Direction::Left);
        let north = node(&game, 4, 1);
        assert_eq!(game.next_direction_towards(north, true), Direction::Up);
    }

    #[test]
    fn blocked_move_keeps_agent_in_place() {
        let mut game = game();
        let start = game.current_agent_node();
        game.process_turn(&mut Scripted(vec![Direction::Down]));
        assert_eq!(game.current_agent_node(), start);
        assert_eq!(game.current_heading(), Direction::Neutral);
    }
}
