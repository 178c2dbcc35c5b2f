//! # Movable Entities
//!
//! Entities that occupy a position on the map and have health: the player,
//! which collects resources, and mobs, which wander on their own.
//!
//! Shared data lives in [`MovableState`]; the [`Movable`] trait exposes it
//! and [`ConcreteMovable`] is the closed set of variants the game stores.

use crate::config::PLAYER_INITIAL_HEALTH;
use crate::{new_entity_id, EntityId, FlatcraftError, FlatcraftResult, Position, Resource, Sprite};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Data common to every movable entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovableState {
    pub id: EntityId,
    pub row: i32,
    pub column: i32,
    pub sprite: Sprite,
    pub health: u32,
}

impl MovableState {
    /// Creates the state of a new entity at the top-left corner of the map.
    pub fn new(sprite: Sprite, initial_health: u32) -> Self {
        Self {
            id: new_entity_id(),
            row: 0,
            column: 0,
            sprite,
            health: initial_health,
        }
    }
}

/// Capabilities shared by all entities moving on the map.
///
/// Row and column are the entity's own view of where it stands; they are
/// only interpreted against the map by the game.
pub trait Movable {
    /// Gets the shared entity state.
    fn state(&self) -> &MovableState;

    /// Gets the shared entity state mutably.
    fn state_mut(&mut self) -> &mut MovableState;

    fn id(&self) -> EntityId {
        self.state().id
    }

    fn row(&self) -> i32 {
        self.state().row
    }

    fn set_row(&mut self, row: i32) {
        self.state_mut().row = row;
    }

    fn column(&self) -> i32 {
        self.state().column
    }

    fn set_column(&mut self, column: i32) {
        self.state_mut().column = column;
    }

    fn position(&self) -> Position {
        Position::new(self.row(), self.column())
    }

    fn set_position(&mut self, position: Position) {
        self.set_row(position.row);
        self.set_column(position.column);
    }

    fn sprite(&self) -> &Sprite {
        &self.state().sprite
    }

    fn health(&self) -> u32 {
        self.state().health
    }

    fn is_alive(&self) -> bool {
        self.health() > 0
    }

    fn increment_health(&mut self) {
        self.state_mut().health += 1;
    }

    /// Removes one health point.
    ///
    /// Returns `true` exactly when this call brought the health to zero; the
    /// caller is then responsible for removing the entity from the game.
    fn decrement_health(&mut self) -> bool {
        let state = self.state_mut();
        if state.health == 0 {
            return false;
        }
        state.health -= 1;
        state.health == 0
    }
}

/// Resources collected by the player, with a count per resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: HashMap<Resource, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: Resource) {
        *self.items.entry(resource).or_insert(0) += 1;
    }

    /// Takes one unit of a resource out of the inventory.
    pub fn remove(&mut self, resource: &Resource) -> FlatcraftResult<()> {
        let count = self
            .items
            .get_mut(resource)
            .ok_or_else(|| FlatcraftError::InventoryMiss(resource.name().to_string()))?;
        *count -= 1;
        if *count == 0 {
            self.items.remove(resource);
        }
        Ok(())
    }

    /// Number of units held of a resource.
    pub fn count(&self, resource: &Resource) -> u32 {
        self.items.get(resource).copied().unwrap_or(0)
    }

    pub fn contains(&self, resource: &Resource) -> bool {
        self.items.contains_key(resource)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of units held, all resources together.
    pub fn total(&self) -> u32 {
        self.items.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Resource, u32)> {
        self.items.iter().map(|(resource, count)| (resource, *count))
    }

    /// Counts keyed by resource name, in name order.
    pub fn counts_by_name(&self) -> BTreeMap<String, u32> {
        self.items
            .iter()
            .map(|(resource, count)| (resource.name().to_string(), *count))
            .collect()
    }
}

/// The character controlled by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    state: MovableState,
    inventory: Inventory,
}

impl Player {
    /// Creates a player with full health and an empty inventory.
    pub fn new(sprite: Sprite) -> Self {
        Self {
            state: MovableState::new(sprite, PLAYER_INITIAL_HEALTH),
            inventory: Inventory::new(),
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn add_to_inventory(&mut self, resource: Resource) {
        self.inventory.add(resource);
    }

    pub fn remove_from_inventory(&mut self, resource: &Resource) -> FlatcraftResult<()> {
        self.inventory.remove(resource)
    }
}

impl Movable for Player {
    fn state(&self) -> &MovableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MovableState {
        &mut self.state
    }
}

/// A creature wandering left and right on its own.
///
/// Its moves are decided by the game on scheduler ticks; see
/// [`crate::FlatcraftGame::animate_mob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mob {
    state: MovableState,
}

impl Mob {
    pub fn new(sprite: Sprite, initial_health: u32) -> Self {
        Self {
            state: MovableState::new(sprite, initial_health),
        }
    }
}

impl Movable for Mob {
    fn state(&self) -> &MovableState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MovableState {
        &mut self.state
    }
}

/// Kinds of movable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovableKind {
    Player,
    Mob,
}

/// Any movable entity stored by the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcreteMovable {
    Player(Player),
    Mob(Mob),
}

impl ConcreteMovable {
    pub fn kind(&self) -> MovableKind {
        match self {
            ConcreteMovable::Player(_) => MovableKind::Player,
            ConcreteMovable::Mob(_) => MovableKind::Mob,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            ConcreteMovable::Player(player) => Some(player),
            ConcreteMovable::Mob(_) => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            ConcreteMovable::Player(player) => Some(player),
            ConcreteMovable::Mob(_) => None,
        }
    }
}

impl Movable for ConcreteMovable {
    fn state(&self) -> &MovableState {
        match self {
            ConcreteMovable::Player(player) => player.state(),
            ConcreteMovable::Mob(mob) => mob.state(),
        }
    }

    fn state_mut(&mut self) -> &mut MovableState {
        match self {
            ConcreteMovable::Player(player) => player.state_mut(),
            ConcreteMovable::Mob(mob) => mob.state_mut(),
        }
    }
}

impl From<Player> for ConcreteMovable {
    fn from(player: Player) -> Self {
        ConcreteMovable::Player(player)
    }
}

impl From<Mob> for ConcreteMovable {
    fn from(mob: Mob) -> Self {
        ConcreteMovable::Mob(mob)
    }
}
