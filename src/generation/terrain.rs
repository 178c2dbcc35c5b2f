//! # Map Generation
//!
//! Builds whole maps out of factory cells: a plain map made of three strata
//! (sky, surface, subsoil), then trees and slag heaps dropped at random on
//! the surface. Later decorations simply overwrite earlier ones.

use crate::config::{MAX_SLAG_HEAP_HEIGHT, MAX_TREE_HEIGHT};
use crate::{
    Cell, CellFactory, FlatcraftError, FlatcraftResult, GameMap, GenerationConfig, Generator,
    RandomSource,
};
use log::debug;

/// Map generator. Holds no state; every call starts from scratch.
///
/// # Examples
///
/// ```
/// use flatcraft::{CellFactory, GameMapGenerator, SeededRandom, SpriteCache};
///
/// let mut factory = CellFactory::new(Box::new(SpriteCache::with_default_catalog()));
/// let mut rng = SeededRandom::new(42);
/// let map = GameMapGenerator::generate_plain_map(9, 12, &mut factory, &mut rng).unwrap();
/// assert_eq!(map.soil_height(), 6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GameMapGenerator;

impl GameMapGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a map made of sky above the soil height, one row of surface
    /// at the soil height, and subsoil below it.
    pub fn generate_plain_map(
        height: i32,
        width: i32,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
    ) -> FlatcraftResult<GameMap> {
        let mut map = GameMap::new(height, width, 2 * height / 3)?;
        let soil_height = map.soil_height();

        for row in 0..soil_height {
            for column in 0..width {
                let cell = factory.create_sky(rng)?;
                map.set_at(row, column, &cell)?;
            }
        }

        for column in 0..width {
            let cell = factory.create_soil_surface(rng)?;
            map.set_at(soil_height, column, &cell)?;
        }

        for row in soil_height + 1..height {
            for column in 0..width {
                let cell = factory.create_sub_soil(rng)?;
                map.set_at(row, column, &cell)?;
            }
        }

        debug!(
            "Generated plain {}x{} map with soil at row {}",
            height, width, soil_height
        );
        Ok(map)
    }

    /// Generates a plain map and plants trees on it.
    pub fn generate_map_with_trees(
        height: i32,
        width: i32,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
        nb_trees: u32,
    ) -> FlatcraftResult<GameMap> {
        Self::generate_map_with_trees_and_slag_heaps(height, width, factory, rng, nb_trees, 0)
    }

    /// Generates a plain map and piles slag heaps on it.
    pub fn generate_map_with_slag_heaps(
        height: i32,
        width: i32,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
        nb_slag_heaps: u32,
    ) -> FlatcraftResult<GameMap> {
        Self::generate_map_with_trees_and_slag_heaps(height, width, factory, rng, 0, nb_slag_heaps)
    }

    /// Generates a plain map, then plants the trees, then piles the slag heaps.
    pub fn generate_map_with_trees_and_slag_heaps(
        height: i32,
        width: i32,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
        nb_trees: u32,
        nb_slag_heaps: u32,
    ) -> FlatcraftResult<GameMap> {
        let mut map = Self::generate_plain_map(height, width, factory, rng)?;
        for _ in 0..nb_trees {
            Self::add_tree(&mut map, factory, rng)?;
        }
        for _ in 0..nb_slag_heaps {
            Self::add_slag_heap(&mut map, factory, rng)?;
        }
        Ok(map)
    }

    /// Plants a tree on the surface.
    ///
    /// The trunk, from 1 to `MAX_TREE_HEIGHT` cells, rises from the soil row
    /// at a column away from both edges. Leaves cover the three cells of the
    /// row above the trunk and the two cells beside its top. Parts that would
    /// stick out of the top of the map are left out.
    pub fn add_tree(
        map: &mut GameMap,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
    ) -> FlatcraftResult<()> {
        if map.width() < 3 {
            return Err(FlatcraftError::InvalidConfig(format!(
                "cannot plant a tree on a map {} columns wide",
                map.width()
            )));
        }

        let tree_height = rng.next_in_range(MAX_TREE_HEIGHT as u32) as i32 + 1;
        let column = rng.next_in_range((map.width() - 2) as u32) as i32 + 1;
        let mut row = map.soil_height();

        let trunk = factory.create_trunk()?;
        for _ in 0..tree_height {
            set_if_inside(map, row, column, &trunk)?;
            row -= 1;
        }

        let leaves = factory.create_leaves()?;
        for (leaf_row, leaf_column) in [
            (row, column + 1),
            (row, column),
            (row, column - 1),
            (row + 1, column + 1),
            (row + 1, column - 1),
        ] {
            set_if_inside(map, leaf_row, leaf_column, &leaves)?;
        }

        debug!("Planted tree of height {} at column {}", tree_height, column);
        Ok(())
    }

    /// Piles a slag heap on the surface.
    ///
    /// The heap is a triangle of subsoil cells with its apex `heap_height`
    /// rows above the soil; each row below the apex is two cells wider and
    /// starts one column further left. Cells falling outside the map are
    /// skipped, and so is a heap too wide for the map.
    pub fn add_slag_heap(
        map: &mut GameMap,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
    ) -> FlatcraftResult<()> {
        let heap_height = rng.next_in_range(MAX_SLAG_HEAP_HEIGHT as u32) as i32 + 1;
        if map.width() <= heap_height {
            debug!(
                "Skipped slag heap of height {} on a map {} columns wide",
                heap_height,
                map.width()
            );
            return Ok(());
        }

        let mut x = rng.next_in_range((map.width() - heap_height) as u32) as i32 + heap_height;
        let apex_column = x;
        let y = map.soil_height();

        for h in 0..heap_height {
            let row = y - heap_height + h;
            for w in 0..(2 * h + 1) {
                let column = x + w;
                if map.contains(row, column) {
                    let cell = factory.create_sub_soil(rng)?;
                    map.set_at(row, column, &cell)?;
                }
            }
            x -= 1;
        }

        debug!(
            "Piled slag heap of height {} with apex at column {}",
            heap_height, apex_column
        );
        Ok(())
    }
}

impl Generator<GameMap> for GameMapGenerator {
    fn generate(
        &self,
        config: &GenerationConfig,
        factory: &mut CellFactory,
        rng: &mut dyn RandomSource,
    ) -> FlatcraftResult<GameMap> {
        config.validate()?;
        let map = Self::generate_map_with_trees_and_slag_heaps(
            config.height,
            config.width,
            factory,
            rng,
            config.tree_count,
            config.slag_heap_count,
        )?;
        self.validate(&map, config)?;
        Ok(map)
    }

    fn validate(&self, content: &GameMap, config: &GenerationConfig) -> FlatcraftResult<()> {
        if content.height() != config.height || content.width() != config.width {
            return Err(FlatcraftError::InvalidState(format!(
                "generated a {}x{} map for a {}x{} configuration",
                content.height(),
                content.width(),
                config.height,
                config.width
            )));
        }
        if content.soil_height() != config.soil_height() {
            return Err(FlatcraftError::InvalidState(format!(
                "soil at row {} instead of {}",
                content.soil_height(),
                config.soil_height()
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "GameMapGenerator"
    }
}

/// Copies `cell` into the map when the location exists. Returns whether it did.
fn set_if_inside(map: &mut GameMap, row: i32, column: i32, cell: &Cell) -> FlatcraftResult<bool> {
    if !map.contains(row, column) {
        return Ok(false);
    }
    map.set_at(row, column, cell)?;
    Ok(true)
}
