//! # Flatcraft
//!
//! Core model of a small 2D sandbox game in the spirit of Terraria and Minecraft.
//!
//! ## Architecture Overview
//!
//! The crate contains the game model only; drawing and input belong to
//! whatever front-end drives it. The main pieces are:
//!
//! - **Game Model**: cells, resources, the tile map and the movable entities
//! - **Generation System**: stochastic cell creation and whole-map generation
//!   (terrain strata, trees, slag heaps) over an injected random source
//! - **Sprites**: a cached lookup from sprite identifiers to opaque handles
//! - **Session**: an actor that serializes every game mutation onto one task
//!
//! All map and entity mutations go through [`FlatcraftGame`], which keeps
//! the entity registry consistent and notifies a [`GameView`] of changes.

pub mod game;
pub mod generation;
pub mod session;
pub mod sprites;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use session::*;
pub use sprites::*;

/// Core error type for the Flatcraft game model.
#[derive(thiserror::Error, Debug)]
pub enum FlatcraftError {
    /// A map was requested with a non-positive dimension
    #[error("Incorrect map dimension: {height}x{width}")]
    InvalidDimension { height: i32, width: i32 },

    /// A cell was accessed outside of the map
    #[error("Incorrect cell location ({row}, {column}) for a {height}x{width} map")]
    OutOfBounds {
        row: i32,
        column: i32,
        height: i32,
        width: i32,
    },

    /// No sprite is known for the identifier
    #[error("Could not load sprite {0}")]
    AssetNotFound(String),

    /// The resource is not in the player's inventory
    #[error("Resource {0} is not in the inventory")]
    InventoryMiss(String),

    /// Game state does not allow the operation
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Generation configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The session actor is no longer running
    #[error("Game session is closed")]
    SessionClosed,
}

/// Result type used throughout the Flatcraft codebase.
pub type FlatcraftResult<T> = Result<T, FlatcraftError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default map height in cells
    pub const DEFAULT_MAP_HEIGHT: i32 = 16;

    /// Default map width in cells
    pub const DEFAULT_MAP_WIDTH: i32 = 40;

    /// Number of trees planted by `FlatcraftGame::prepare` by default
    pub const DEFAULT_TREE_COUNT: u32 = 10;

    /// Number of slag heaps piled by `FlatcraftGame::prepare` by default
    pub const DEFAULT_SLAG_HEAP_COUNT: u32 = 2;

    /// Tallest trunk a generated tree can have
    pub const MAX_TREE_HEIGHT: i32 = 5;

    /// Tallest slag heap the generator can pile
    pub const MAX_SLAG_HEAP_HEIGHT: i32 = 8;

    /// Health the player starts with
    pub const PLAYER_INITIAL_HEALTH: u32 = 3;

    /// Side of a square sprite, in pixels
    pub const SPRITE_SIZE: u32 = 32;

    /// Scheduler ticks between two moves of an animated mob
    pub const DEFAULT_MOB_MOVE_PERIOD: u64 = 1;
}
