use std::{collections::VecDeque, ops::Index};

use serde::{Deserialize, Serialize};

use crate::{Direction, Node, Position};

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Errors raised while parsing a maze layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("Maze string is empty")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown maze tile '{tile}' at position ({x}, {y})")]
    UnknownTile { tile: char, x: usize, y: usize },
    #[error("Multiple agent start positions ('P') found")]
    MultipleStarts,
    #[error("No agent start position ('P') found")]
    NoStart,
    #[error("No ghost lair ('G') found")]
    NoLair,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Static content of a maze cell as loaded from the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Wall,
    Floor,
    Pill,
    PowerPill,
    /// Ghost holding pen. Ghosts may walk through it, the agent may not.
    Lair,
}

impl Tile {
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts (x, y) coordinates to a flat vector index.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[inline]
    pub fn coords_to_index(&self, x: usize, y: usize) -> Option<usize> {
        if self.is_valid(x, y) {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Checks if the given coordinates are within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Gets an immutable reference to the cell at the given coordinates.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.coords_to_index(x, y).and_then(|index| self.cells.get(index))
    }

    /// Sets the value of the cell at the given coordinates.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<(), GridError> {
        let index = self.coords_to_index(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator that yields `((x, y), &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| ((index % width, index / width), cell))
    }
}

/// Indexing using Position coordinates for access
impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: Position) -> &Self::Output {
        match self.coords_to_index(index.x, index.y) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                index.x, index.y, self.width, self.height
            ),
        }
    }
}

/// A maze graph built from a character layout.
///
/// Every walkable cell becomes a [`Node`], numbered in row-major order. Path
/// distances between all pairs of nodes are computed once at load time.
///
/// Layout characters: `#` wall, `.` pill, `o` power pill, space empty floor,
/// `P` agent start, `G` ghost lair.
#[derive(Debug, Clone)]
pub struct Maze {
    tiles: Grid<Tile>,
    nodes: Grid<Option<Node>>,
    positions: Vec<Position>,
    /// Indexed by node, then by position of the direction in `Direction::MOVES`.
    neighbours: Vec<[Option<Node>; 4]>,
    /// Row-major `node_count * node_count` table. `u32::MAX` marks unreachable pairs.
    distances: Vec<u32>,
    agent_start: Node,
    lair: Vec<Node>,
}

fn move_index(direction: Direction) -> Option<usize> {
    Direction::MOVES.iter().position(|d| *d == direction)
}

impl Maze {
    /// Parses a maze layout.
    pub fn parse(layout: &str) -> Result<Self, MazeError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return Err(MazeError::Empty);
        }

        let height = lines.len();
        let width = lines[0].chars().count();
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::InconsistentWidth {
                    row,
                    expected: width,
                    found,
                });
            }
        }

        let mut tiles: Grid<Tile> = Grid::new(width, height);
        let mut start: Option<Position> = None;

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    ' ' => Tile::Floor,
                    '.' => Tile::Pill,
                    'o' => Tile::PowerPill,
                    'G' => Tile::Lair,
                    'P' => {
                        if start.is_some() {
                            return Err(MazeError::MultipleStarts);
                        }
                        start = Some(Position { x, y });
                        Tile::Floor
                    }
                    tile => return Err(MazeError::UnknownTile { tile, x, y }),
                };
                tiles.set(x, y, tile)?;
            }
        }

        let start = start.ok_or(MazeError::NoStart)?;

        let mut nodes: Grid<Option<Node>> = Grid::new(width, height);
        let mut positions = Vec::new();
        for ((x, y), tile) in tiles.enumerate() {
            if tile.is_walkable() {
                nodes.set(x, y, Some(positions.len()))?;
                positions.push(Position { x, y });
            }
        }

        let neighbours: Vec<[Option<Node>; 4]> = positions
            .iter()
            .map(|pos| {
                Direction::MOVES.map(|direction| {
                    let (dx, dy) = direction.delta();
                    let x = pos.x.checked_add_signed(dx)?;
                    let y = pos.y.checked_add_signed(dy)?;
                    nodes.get(x, y).copied().flatten()
                })
            })
            .collect();

        let lair: Vec<Node> = positions
            .iter()
            .enumerate()
            .filter(|(_, pos)| tiles[**pos] == Tile::Lair)
            .map(|(node, _)| node)
            .collect();
        if lair.is_empty() {
            return Err(MazeError::NoLair);
        }

        let distances = all_pairs_distances(&neighbours);
        let agent_start = nodes[start].ok_or(MazeError::NoStart)?;

        Ok(Maze {
            tiles,
            nodes,
            positions,
            neighbours,
            distances,
            agent_start,
            lair,
        })
    }

    pub fn tiles(&self) -> &Grid<Tile> {
        &self.tiles
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn node_at(&self, position: Position) -> Option<Node> {
        self.nodes.get(position.x, position.y).copied().flatten()
    }

    pub fn position(&self, node: Node) -> Position {
        self.positions[node]
    }

    pub fn tile(&self, node: Node) -> Tile {
        self.tiles[self.positions[node]]
    }

    pub fn is_lair(&self, node: Node) -> bool {
        self.tile(node) == Tile::Lair
    }

    /// Neighbour one step away, walking through lair cells too.
    pub fn neighbour(&self, node: Node, direction: Direction) -> Option<Node> {
        let index = move_index(direction)?;
        self.neighbours.get(node)?[index]
    }

    /// Neighbour one step away for the agent, which cannot enter the lair.
    pub fn agent_neighbour(&self, node: Node, direction: Direction) -> Option<Node> {
        self.neighbour(node, direction).filter(|next| !self.is_lair(*next))
    }

    /// Shortest path length between two nodes, `u32::MAX` if disconnected.
    pub fn distance(&self, a: Node, b: Node) -> u32 {
        self.distances[a * self.node_count() + b]
    }

    pub fn agent_start(&self) -> Node {
        self.agent_start
    }

    pub fn lair_nodes(&self) -> &[Node] {
        &self.lair
    }

    /// Nodes that hold a tile of the given kind in the original layout.
    pub fn nodes_with(&self, tile: Tile) -> Vec<Node> {
        (0..self.node_count())
            .filter(|node| self.tile(*node) == tile)
            .collect()
    }
}

/// Breadth-first search from every node.
fn all_pairs_distances(neighbours: &[[Option<Node>; 4]]) -> Vec<u32> {
    let count = neighbours.len();
    let mut distances = vec![u32::MAX; count * count];
    let mut frontier = VecDeque::new();

    for source in 0..count {
        let row = &mut distances[source * count..(source + 1) * count];
        row[source] = 0;
        frontier.push_back(source);

        while let Some(current) = frontier.pop_front() {
            let next_distance = row[current] + 1;
            for next in neighbours[current].iter().flatten() {
                if row[*next] == u32::MAX {
                    row[*next] = next_distance;
                    frontier.push_back(*next);
                }
            }
        }
    }

    distances
}
