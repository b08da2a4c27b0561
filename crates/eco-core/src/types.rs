//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// One step in `direction`, without any boundary handling
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Apply toroidal wrapping for given world dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: ((self.x % width) + width) % width,
            y: ((self.y % height) + height) % height,
        }
    }

    pub fn is_within(&self, width: i32, height: i32) -> bool {
        (0..width).contains(&self.x) && (0..height).contains(&self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Compass direction, listed clockwise starting from north.
///
/// Turning by `n` steps moves `n * 45` degrees clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const COUNT: usize = 8;

    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::all()[index % Self::COUNT]
    }

    /// Rotate clockwise by `steps` eighth-turns
    pub fn turn(&self, steps: usize) -> Self {
        Self::from_index(self.index() + steps)
    }
}
