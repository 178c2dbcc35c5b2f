//! # Cell Generation
//!
//! Stochastic creation of single cells for each stratum of the map.

use crate::{Cell, FlatcraftResult, RandomSource, Resource, Sprite, SpriteStore};

/// Terrain sprites used for sky cells.
pub const SKY_TERRAINS: &[&str] = &["cloud", "ice"];

/// Resources found on the ground surface.
pub const SURFACE_RESOURCES: &[&str] = &["junglegrass", "water", "grass"];

/// Resources found under the surface, rare ores first, dirt last.
pub const SUBSOIL_RESOURCES: &[&str] = &[
    "gold_block",
    "diamond_block",
    "bronze_block",
    "coal_block",
    "copper_block",
    "dirt",
];

/// Creates the cells the map generator assembles into maps.
///
/// The factory owns the sprite store; randomness is passed to each call.
pub struct CellFactory {
    sprites: Box<dyn SpriteStore + Send>,
}

impl CellFactory {
    pub fn new(sprites: Box<dyn SpriteStore + Send>) -> Self {
        Self { sprites }
    }

    /// Looks up a sprite through the factory's store.
    pub fn sprite(&mut self, identifier: &str) -> FlatcraftResult<Sprite> {
        self.sprites.create_sprite(identifier)
    }

    /// Creates a sky cell: a cloud one time out of ten, clear sky otherwise.
    pub fn create_sky(&mut self, rng: &mut dyn RandomSource) -> FlatcraftResult<Cell> {
        if rng.next_in_range(10) < 1 {
            return self.create_cell("cloud");
        }
        self.create_cell("ice")
    }

    /// Creates a surface cell.
    ///
    /// Two independent rolls: jungle grass one time out of ten, then water
    /// two times out of ten among the rest, grass otherwise.
    pub fn create_soil_surface(&mut self, rng: &mut dyn RandomSource) -> FlatcraftResult<Cell> {
        if rng.next_in_range(10) < 1 {
            return self.create_resource_cell("junglegrass");
        }
        if rng.next_in_range(10) < 2 {
            return self.create_resource_cell("water");
        }
        self.create_resource_cell("grass")
    }

    /// Creates a subsoil cell: each ore one time out of twenty, dirt otherwise.
    pub fn create_sub_soil(&mut self, rng: &mut dyn RandomSource) -> FlatcraftResult<Cell> {
        let name = match rng.next_in_range(20) {
            0 => "gold_block",
            1 => "diamond_block",
            2 => "bronze_block",
            3 => "coal_block",
            4 => "copper_block",
            _ => "dirt",
        };
        self.create_resource_cell(name)
    }

    /// Creates a tree trunk cell.
    pub fn create_trunk(&mut self) -> FlatcraftResult<Cell> {
        self.create_cell("tree")
    }

    /// Creates a leaves cell.
    pub fn create_leaves(&mut self) -> FlatcraftResult<Cell> {
        self.create_cell("leaves")
    }

    fn create_cell(&mut self, name: &str) -> FlatcraftResult<Cell> {
        let sprite = self.sprites.create_sprite(name)?;
        Ok(Cell::with_sprite(sprite))
    }

    fn create_resource_cell(&mut self, name: &str) -> FlatcraftResult<Cell> {
        let sprite = self.sprites.create_sprite(name)?;
        Ok(Cell::with_resource(Resource::new(name, sprite)))
    }
}

impl std::fmt::Debug for CellFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellFactory").finish_non_exhaustive()
    }
}
