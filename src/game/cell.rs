//! # Cells
//!
//! A cell is one tile of the map. It either holds a [`Resource`], which makes
//! it solid and diggable, or nothing, which lets movables fall through it.

use crate::{Movable, Player, Position, Sprite};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A collectible terrain substance such as dirt, grass or an ore.
///
/// Resources are identified by name only: two resources with the same name
/// are equal whatever their sprite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    name: String,
    sprite: Sprite,
}

impl Resource {
    /// Creates a new resource.
    pub fn new(name: impl Into<String>, sprite: Sprite) -> Self {
        Self {
            name: name.into(),
            sprite,
        }
    }

    /// Type key of the resource.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// One tile of the game map.
///
/// The sprite of a cell is the sprite of its resource when it holds one, or a
/// terrain sprite (sky, leaves, trunk) set at creation. It is `None` only for
/// a cell that has neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    row: i32,
    column: i32,
    resource: Option<Resource>,
    sprite: Option<Sprite>,
}

impl Cell {
    /// Creates an empty cell at the given location.
    pub fn new(row: i32, column: i32) -> Self {
        Self {
            row,
            column,
            resource: None,
            sprite: None,
        }
    }

    /// Creates an unplaced, passable cell showing a terrain sprite.
    pub fn with_sprite(sprite: Sprite) -> Self {
        Self {
            sprite: Some(sprite),
            ..Self::new(0, 0)
        }
    }

    /// Creates an unplaced cell holding a resource.
    pub fn with_resource(resource: Resource) -> Self {
        let mut cell = Self::new(0, 0);
        cell.set_resource(Some(resource));
        cell
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    pub fn column(&self) -> i32 {
        self.column
    }

    /// Location recorded in the cell itself.
    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }

    pub fn set_row(&mut self, row: i32) {
        self.row = row;
    }

    pub fn set_column(&mut self, column: i32) {
        self.column = column;
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.resource.as_ref()
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Checks whether movables can fall through this cell.
    pub fn is_empty(&self) -> bool {
        self.resource.is_none()
    }

    /// Puts a resource in the cell, or clears it (sprite included) with `None`.
    pub fn set_resource(&mut self, resource: Option<Resource>) {
        self.sprite = resource.as_ref().map(|resource| resource.sprite().clone());
        self.resource = resource;
    }

    /// Copies the content of another cell into this one, keeping its location.
    pub fn replace_by(&mut self, other: &Cell) {
        self.resource = other.resource.clone();
        self.sprite = other.sprite.clone();
    }

    /// Lets a movable fall through this cell.
    ///
    /// When the cell is empty the movable is put on the row just below it and
    /// `true` is returned; a cell holding a resource blocks the fall and
    /// leaves the movable untouched.
    pub fn move_through<M: Movable + ?Sized>(&self, movable: &mut M) -> bool {
        if self.resource.is_none() {
            movable.set_row(self.row + 1);
            return true;
        }
        false
    }

    /// Extracts the resource of this cell into the player's inventory.
    ///
    /// Returns `false`, with nothing changed, when the cell is empty.
    pub fn dig(&mut self, player: &mut Player) -> bool {
        match self.resource.take() {
            Some(resource) => {
                player.add_to_inventory(resource);
                self.set_resource(None);
                true
            }
            None => false,
        }
    }
}
