//! # Game Module
//!
//! Core game model: the tile map, its cells and the entities moving on it.
//!
//! This module contains the fundamental building blocks of Flatcraft:
//! - Cells and the resources they hold
//! - The fixed-size game map
//! - Movable entities (the player and mobs) and the player's inventory
//! - The game orchestrator applying movement, gravity and digging
//! - The cooperative scheduler driving autonomous mobs
//! - The view interface notified of every visible change

pub mod cell;
pub mod entities;
pub mod map;
pub mod scheduler;
pub mod state;
pub mod view;

pub use cell::*;
pub use entities::*;
pub use map::*;
pub use scheduler::*;
pub use state::*;
pub use view::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A location on the map, as a row (top to bottom) and a column (left to right).
///
/// # Examples
///
/// ```
/// use flatcraft::{Direction, Position};
///
/// let pos = Position::new(6, 5);
/// assert_eq!(pos.neighbor(Direction::Down), Position::new(7, 5));
/// assert_eq!(pos.neighbor(Direction::Left), Position::new(6, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Returns the adjacent position in the given direction.
    pub fn neighbor(self, direction: Direction) -> Self {
        let (d_row, d_column) = direction.to_delta();
        Self::new(self.row + d_row, self.column + d_column)
    }
}

/// Directions in which the player can walk or dig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Converts a direction to a `(row, column)` delta.
    pub fn to_delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

/// Unique identifier for movable entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.row, 5);
        assert_eq!(pos.column, 10);
    }

    #[test]
    fn test_position_neighbors() {
        let pos = Position::new(3, 3);
        assert_eq!(pos.neighbor(Direction::Left), Position::new(3, 2));
        assert_eq!(pos.neighbor(Direction::Right), Position::new(3, 4));
        assert_eq!(pos.neighbor(Direction::Down), Position::new(4, 3));
    }

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = new_entity_id();
        let id2 = new_entity_id();
        assert_ne!(id1, id2);
    }
}
