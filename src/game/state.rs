//! # Game State Module
//!
//! Central game state: the map, the registry of movable entities and the
//! rules moving them around.
//!
//! [`FlatcraftGame`] is the only place where the map and the entities are
//! mutated. It keeps the entity registry and its position index consistent
//! with every move, fall and removal, and reports each of these changes to
//! its [`GameView`] exactly once.

use crate::config::DEFAULT_MOB_MOVE_PERIOD;
use crate::{
    CellFactory, ConcreteMovable, Direction, EntityId, FlatcraftError, FlatcraftResult, GameMap,
    GameMapGenerator, GameView, GenerationConfig, Generator, Mob, MobScheduler, Movable,
    MovableView, NullView, Player, Position, RandomSource, SeededRandom, SpriteCache, SpriteStore,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A running game of Flatcraft.
///
/// # Examples
///
/// ```
/// use flatcraft::{FlatcraftGame, GenerationConfig, Movable};
///
/// let mut game = FlatcraftGame::new(GenerationConfig::for_testing(42));
/// game.prepare().unwrap();
///
/// let player = game.player().unwrap();
/// assert_eq!(player.row(), game.map().unwrap().soil_height());
/// ```
pub struct FlatcraftGame {
    /// Parameters used by `prepare`
    config: GenerationConfig,
    /// Cell factory, also the source of entity sprites
    factory: CellFactory,
    /// Random source shared by generation and mob movement
    rng: Box<dyn RandomSource + Send>,
    /// Receiver of display notifications
    view: Box<dyn GameView + Send>,
    /// Current map, `None` until `prepare` is called
    map: Option<GameMap>,
    /// All movable entities, indexed by ID
    entities: HashMap<EntityId, ConcreteMovable>,
    /// Spatial index mapping positions to entity IDs
    position_index: HashMap<Position, Vec<EntityId>>,
    /// The player entity ID
    player_id: Option<EntityId>,
    /// Timers of the animated mobs
    scheduler: MobScheduler,
    /// Ticks between two moves of a newly animated mob
    mob_move_period: u64,
}

/// Serializable summary of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub movable: MovableView,
    pub inventory: BTreeMap<String, u32>,
}

/// Serializable summary of a game, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub height: i32,
    pub width: i32,
    pub soil_height: Option<i32>,
    pub tick: u64,
    pub player: Option<PlayerSnapshot>,
    pub mobs: Vec<MovableView>,
}

impl FlatcraftGame {
    /// Creates a game with the default sprite catalog, a random source seeded
    /// from the configuration, and no view.
    pub fn new(config: GenerationConfig) -> Self {
        let rng = SeededRandom::from_optional_seed(config.seed);
        Self::with_collaborators(
            config,
            Box::new(SpriteCache::with_default_catalog()),
            Box::new(rng),
            Box::new(NullView),
        )
    }

    /// Creates a game with explicit collaborators.
    pub fn with_collaborators(
        config: GenerationConfig,
        sprites: Box<dyn SpriteStore + Send>,
        rng: Box<dyn RandomSource + Send>,
        view: Box<dyn GameView + Send>,
    ) -> Self {
        Self {
            config,
            factory: CellFactory::new(sprites),
            rng,
            view,
            map: None,
            entities: HashMap::new(),
            position_index: HashMap::new(),
            player_id: None,
            scheduler: MobScheduler::new(),
            mob_move_period: DEFAULT_MOB_MOVE_PERIOD,
        }
    }

    /// Replaces the view notified of changes.
    pub fn set_view(&mut self, view: Box<dyn GameView + Send>) {
        self.view = view;
    }

    /// Sets the number of ticks between two moves of mobs animated from now on.
    pub fn set_mob_move_period(&mut self, period: u64) {
        self.mob_move_period = period.max(1);
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn width(&self) -> i32 {
        self.config.width
    }

    pub fn height(&self) -> i32 {
        self.config.height
    }

    /// Current map, once the game is prepared.
    pub fn map(&self) -> Option<&GameMap> {
        self.map.as_ref()
    }

    /// Generates a new map and puts a new player on it.
    ///
    /// The player starts at the horizontal center of the map, on the soil
    /// row. Entities of a previous map are dropped. The view is initialized
    /// once both the map and the player exist.
    pub fn prepare(&mut self) -> FlatcraftResult<()> {
        let generator = GameMapGenerator::new();
        let map = generator.generate(&self.config, &mut self.factory, &mut *self.rng)?;

        self.entities.clear();
        self.position_index.clear();
        self.scheduler = MobScheduler::new();
        self.player_id = None;

        let mut player = Player::new(self.factory.sprite("player")?);
        player.set_position(Position::new(map.soil_height(), map.width() / 2));
        let player_id = player.id();

        info!(
            "Prepared {}x{} map with {} trees and {} slag heaps, player at {:?}",
            map.height(),
            map.width(),
            self.config.tree_count,
            self.config.slag_heap_count,
            player.position()
        );

        self.map = Some(map);
        self.player_id = Some(player_id);
        self.insert_entity(player.into());

        if let Some(map) = &self.map {
            self.view.initialize_view(map);
        }
        self.notify_added(player_id);
        Ok(())
    }

    /// The player, unless the game is not prepared or the player was removed.
    pub fn player(&self) -> Option<&Player> {
        self.player_id
            .and_then(|id| self.entities.get(&id))
            .and_then(ConcreteMovable::as_player)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player_id
    }

    /// Gets a registered entity.
    pub fn movable(&self, entity_id: EntityId) -> Option<&ConcreteMovable> {
        self.entities.get(&entity_id)
    }

    /// Iterates over all registered entities.
    pub fn movables(&self) -> impl Iterator<Item = &ConcreteMovable> {
        self.entities.values()
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Gets all entities at a position.
    pub fn entities_at(&self, position: Position) -> Vec<EntityId> {
        self.position_index
            .get(&position)
            .cloned()
            .unwrap_or_default()
    }

    /// Moves the player one column to the left.
    pub fn move_left(&mut self) -> FlatcraftResult<bool> {
        let player_id = self.require_player_id()?;
        self.move_movable_left(player_id)
    }

    /// Moves the player one column to the right.
    pub fn move_right(&mut self) -> FlatcraftResult<bool> {
        let player_id = self.require_player_id()?;
        self.move_movable_right(player_id)
    }

    /// Moves an entity one column to the left, unless it is on the first column.
    pub fn move_movable_left(&mut self, entity_id: EntityId) -> FlatcraftResult<bool> {
        self.shift(entity_id, Direction::Left)
    }

    /// Moves an entity one column to the right, unless it is on the last column.
    pub fn move_movable_right(&mut self, entity_id: EntityId) -> FlatcraftResult<bool> {
        self.shift(entity_id, Direction::Right)
    }

    /// Digs the cell below the player.
    pub fn dig_down(&mut self) -> FlatcraftResult<bool> {
        self.dig(Direction::Down)
    }

    /// Digs the cell left of the player.
    pub fn dig_left(&mut self) -> FlatcraftResult<bool> {
        self.dig(Direction::Left)
    }

    /// Digs the cell right of the player.
    pub fn dig_right(&mut self) -> FlatcraftResult<bool> {
        self.dig(Direction::Right)
    }

    /// Digs the cell next to the player in a direction, then lets the player
    /// fall.
    ///
    /// Returns whether a resource was collected. Gravity is applied even when
    /// nothing was dug or the target is off the map.
    pub fn dig(&mut self, direction: Direction) -> FlatcraftResult<bool> {
        let player_id = self.require_player_id()?;
        let map = self.map.as_mut().ok_or_else(no_map)?;
        let player = self
            .entities
            .get_mut(&player_id)
            .and_then(ConcreteMovable::as_player_mut)
            .ok_or_else(no_player)?;

        let current = map.get_at(player.row(), player.column())?.position();
        let target = current.neighbor(direction);
        let mut dug = false;
        if map.is_valid_position(target) {
            let cell = map.get_at_mut(target.row, target.column)?;
            dug = cell.dig(player);
            if dug {
                self.view.cell_updated(target.row, target.column, cell);
            }
        }
        debug!("Dig {:?} from {:?}: collected {}", direction, current, dug);

        self.apply_gravity(player_id)?;
        Ok(dug)
    }

    /// Makes an entity fall down its column.
    ///
    /// Starting below the cell the entity stands on, the entity drops into
    /// each empty cell in turn and comes to rest above the first cell holding
    /// a resource, or on the bottom row. The whole fall happens in one call,
    /// and a second call on a resting entity changes nothing.
    pub fn apply_gravity(&mut self, entity_id: EntityId) -> FlatcraftResult<()> {
        let map = self.map.as_ref().ok_or_else(no_map)?;
        let movable = self
            .entities
            .get_mut(&entity_id)
            .ok_or_else(|| unknown_entity(entity_id))?;
        let before = movable_view(movable);

        let current = map.get_at(movable.row(), movable.column())?;
        let column = current.column();
        for row in current.row() + 1..map.height() {
            if !map.get_at(row, column)?.is_empty() {
                break;
            }
            movable.set_row(row);
        }

        let after = movable.position();
        if after != Position::new(before.row, before.column) {
            debug!("{} fell from row {} to row {}", entity_id, before.row, after.row);
            self.record_move(entity_id, before, after);
        }
        Ok(())
    }

    /// Adds a mob to the game.
    pub fn spawn_mob(&mut self, row: i32, column: i32, health: u32) -> FlatcraftResult<EntityId> {
        let map = self.map.as_ref().ok_or_else(no_map)?;
        if !map.contains(row, column) {
            return Err(FlatcraftError::OutOfBounds {
                row,
                column,
                height: map.height(),
                width: map.width(),
            });
        }
        if health == 0 {
            return Err(FlatcraftError::InvalidState(
                "cannot spawn a mob without health".to_string(),
            ));
        }

        let mut mob = Mob::new(self.factory.sprite("mob")?, health);
        mob.set_position(Position::new(row, column));
        let mob_id = mob.id();

        self.insert_entity(mob.into());
        self.notify_added(mob_id);
        debug!("Spawned mob {} at ({}, {})", mob_id, row, column);
        Ok(mob_id)
    }

    /// Starts the autonomous movement of a mob.
    pub fn animate_mob(&mut self, entity_id: EntityId) -> FlatcraftResult<()> {
        match self.entities.get(&entity_id) {
            Some(ConcreteMovable::Mob(_)) => {
                self.scheduler.schedule(entity_id, self.mob_move_period);
                Ok(())
            }
            Some(ConcreteMovable::Player(_)) => Err(FlatcraftError::InvalidState(
                "the player cannot be animated".to_string(),
            )),
            None => Err(unknown_entity(entity_id)),
        }
    }

    /// Stops the autonomous movement of a mob. Returns whether it was animated.
    pub fn stop_mob(&mut self, entity_id: EntityId) -> bool {
        self.scheduler.cancel(entity_id)
    }

    pub fn is_animated(&self, entity_id: EntityId) -> bool {
        self.scheduler.is_scheduled(entity_id)
    }

    /// Number of scheduler ticks elapsed.
    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Advances the scheduler by one tick.
    ///
    /// Every mob due on this tick takes one step left or right, with even
    /// odds. Returns the mobs that acted.
    pub fn tick(&mut self) -> FlatcraftResult<Vec<EntityId>> {
        let due = self.scheduler.advance();
        for &mob_id in &due {
            if self.rng.next_in_range(2) == 0 {
                self.move_movable_left(mob_id)?;
            } else {
                self.move_movable_right(mob_id)?;
            }
        }
        Ok(due)
    }

    /// Gives one health point to an entity.
    pub fn increment_health(&mut self, entity_id: EntityId) -> FlatcraftResult<()> {
        self.entities
            .get_mut(&entity_id)
            .ok_or_else(|| unknown_entity(entity_id))?
            .increment_health();
        Ok(())
    }

    /// Takes one health point from an entity, removing it from the game when
    /// none is left. Returns whether the entity was removed.
    pub fn decrement_health(&mut self, entity_id: EntityId) -> FlatcraftResult<bool> {
        let depleted = self
            .entities
            .get_mut(&entity_id)
            .ok_or_else(|| unknown_entity(entity_id))?
            .decrement_health();
        if depleted {
            self.remove_movable(entity_id)?;
        }
        Ok(depleted)
    }

    /// Removes an entity from the game.
    ///
    /// The entity leaves the registry and the position index, its timer is
    /// cancelled, and the view is told it is gone.
    pub fn remove_movable(&mut self, entity_id: EntityId) -> FlatcraftResult<()> {
        let movable = self
            .entities
            .remove(&entity_id)
            .ok_or_else(|| unknown_entity(entity_id))?;
        self.remove_entity_from_position_index(entity_id, movable.position());
        self.scheduler.cancel(entity_id);
        if self.player_id == Some(entity_id) {
            self.player_id = None;
        }

        info!("Removed {:?} {}", movable.kind(), entity_id);
        self.view.remove_movable_object(&movable_view(&movable));
        Ok(())
    }

    /// Captures the state of the game for reporting.
    pub fn snapshot(&self) -> GameSnapshot {
        let player = self.player().map(|player| PlayerSnapshot {
            movable: MovableView::of(player, crate::MovableKind::Player),
            inventory: player.inventory().counts_by_name(),
        });

        let mut mobs: Vec<MovableView> = self
            .entities
            .values()
            .filter(|movable| matches!(movable, ConcreteMovable::Mob(_)))
            .map(movable_view)
            .collect();
        mobs.sort_by_key(|mob| (mob.row, mob.column, mob.id));

        GameSnapshot {
            height: self.config.height,
            width: self.config.width,
            soil_height: self.map.as_ref().map(GameMap::soil_height),
            tick: self.scheduler.current_tick(),
            player,
            mobs,
        }
    }

    /// Moves an entity one column sideways when the target column exists.
    fn shift(&mut self, entity_id: EntityId, direction: Direction) -> FlatcraftResult<bool> {
        let width = self.map.as_ref().ok_or_else(no_map)?.width();
        let movable = self
            .entities
            .get_mut(&entity_id)
            .ok_or_else(|| unknown_entity(entity_id))?;

        let target = movable.position().neighbor(direction);
        if !(0..width).contains(&target.column) {
            return Ok(false);
        }

        let before = movable_view(movable);
        movable.set_position(target);
        self.record_move(entity_id, before, target);
        Ok(true)
    }

    /// Updates the position index and the view after an entity moved.
    fn record_move(&mut self, entity_id: EntityId, before: MovableView, after: Position) {
        self.remove_entity_from_position_index(entity_id, Position::new(before.row, before.column));
        self.view.remove_movable_object(&before);
        self.add_entity_to_position_index(entity_id, after);
        self.notify_added(entity_id);
    }

    fn insert_entity(&mut self, movable: ConcreteMovable) {
        let entity_id = movable.id();
        let position = movable.position();
        self.entities.insert(entity_id, movable);
        self.add_entity_to_position_index(entity_id, position);
    }

    fn notify_added(&mut self, entity_id: EntityId) {
        if let Some(movable) = self.entities.get(&entity_id) {
            self.view.add_movable_object(&movable_view(movable));
        }
    }

    fn require_player_id(&self) -> FlatcraftResult<EntityId> {
        self.player_id.ok_or_else(no_player)
    }

    /// Adds entity to position index.
    fn add_entity_to_position_index(&mut self, entity_id: EntityId, position: Position) {
        self.position_index
            .entry(position)
            .or_default()
            .push(entity_id);
    }

    /// Removes entity from position index.
    fn remove_entity_from_position_index(&mut self, entity_id: EntityId, position: Position) {
        if let Some(entities) = self.position_index.get_mut(&position) {
            entities.retain(|&id| id != entity_id);
            if entities.is_empty() {
                self.position_index.remove(&position);
            }
        }
    }
}

impl std::fmt::Debug for FlatcraftGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatcraftGame")
            .field("config", &self.config)
            .field("map", &self.map)
            .field("entities", &self.entities)
            .field("player_id", &self.player_id)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

fn movable_view(movable: &ConcreteMovable) -> MovableView {
    MovableView::of(movable, movable.kind())
}

fn no_map() -> FlatcraftError {
    FlatcraftError::InvalidState("Game is not prepared".to_string())
}

fn no_player() -> FlatcraftError {
    FlatcraftError::InvalidState("No player found".to_string())
}

fn unknown_entity(entity_id: EntityId) -> FlatcraftError {
    FlatcraftError::InvalidState(format!("Entity {} not found", entity_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, RecordingView, ViewEvent};

    /// Random source always answering the same value.
    struct Constant(u32);

    impl RandomSource for Constant {
        fn next_in_range(&mut self, bound: u32) -> u32 {
            self.0.min(bound - 1)
        }
    }

    fn prepared_game(seed: u64) -> (FlatcraftGame, RecordingView) {
        let recorder = RecordingView::new();
        let mut game = FlatcraftGame::with_collaborators(
            GenerationConfig::new(10, 10).with_decorations(0, 0),
            Box::new(SpriteCache::with_default_catalog()),
            Box::new(SeededRandom::new(seed)),
            Box::new(recorder.clone()),
        );
        game.prepare().unwrap();
        (game, recorder)
    }

    fn clear_cell(game: &mut FlatcraftGame, row: i32, column: i32) {
        let map = game.map.as_mut().unwrap();
        map.set_at(row, column, &Cell::new(0, 0)).unwrap();
    }

    #[test]
    fn test_game_creation() {
        let game = FlatcraftGame::new(GenerationConfig::for_testing(1));
        assert!(game.map().is_none());
        assert!(game.player().is_none());
        assert_eq!(game.entity_count(), 0);
        assert_eq!(game.width(), 10);
        assert_eq!(game.height(), 10);
    }

    #[test]
    fn test_prepare_places_player() {
        let (game, recorder) = prepared_game(12345);
        let player = game.player().unwrap();

        assert_eq!(player.position(), Position::new(6, 5));
        assert_eq!(player.health(), 3);
        assert_eq!(game.entities_at(Position::new(6, 5)), vec![player.id()]);

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ViewEvent::MapInitialized { soil_height: 6, .. }));
        assert!(matches!(events[1], ViewEvent::MovableAdded(ref view) if view.id == player.id()));
    }

    #[test]
    fn test_prepare_twice_replaces_entities() {
        let (mut game, _) = prepared_game(3);
        let first_player = game.player_id().unwrap();
        game.spawn_mob(2, 2, 1).unwrap();

        game.prepare().unwrap();

        assert_eq!(game.entity_count(), 1);
        assert_ne!(game.player_id(), Some(first_player));
    }

    #[test]
    fn test_operations_require_prepare() {
        let mut game = FlatcraftGame::new(GenerationConfig::for_testing(1));
        assert!(matches!(game.move_left(), Err(FlatcraftError::InvalidState(_))));
        assert!(matches!(game.dig_down(), Err(FlatcraftError::InvalidState(_))));
        assert!(game.spawn_mob(0, 0, 1).is_err());
    }

    #[test]
    fn test_move_left_and_right() {
        let (mut game, recorder) = prepared_game(8);
        recorder.take_events();

        assert!(game.move_left().unwrap());
        assert_eq!(game.player().unwrap().column(), 4);
        assert!(game.move_right().unwrap());
        assert!(game.move_right().unwrap());
        assert_eq!(game.player().unwrap().column(), 6);

        // Each move is one removal and one addition
        let events = recorder.events();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], ViewEvent::MovableRemoved(ref view) if view.column == 5));
        assert!(matches!(events[1], ViewEvent::MovableAdded(ref view) if view.column == 4));
    }

    #[test]
    fn test_moves_stop_at_edges() {
        let (mut game, _) = prepared_game(8);
        for _ in 0..5 {
            assert!(game.move_left().unwrap());
        }
        assert_eq!(game.player().unwrap().column(), 0);
        assert!(!game.move_left().unwrap());
        assert_eq!(game.player().unwrap().column(), 0);

        for _ in 0..9 {
            assert!(game.move_right().unwrap());
        }
        assert!(!game.move_right().unwrap());
        assert_eq!(game.player().unwrap().column(), 9);
    }

    #[test]
    fn test_position_index_follows_moves() {
        let (mut game, _) = prepared_game(8);
        let player_id = game.player_id().unwrap();

        game.move_left().unwrap();

        assert!(game.entities_at(Position::new(6, 5)).is_empty());
        assert_eq!(game.entities_at(Position::new(6, 4)), vec![player_id]);
    }

    #[test]
    fn test_dig_down_collects_and_falls() {
        let (mut game, _) = prepared_game(12345);
        let below = game.map().unwrap().get_at(7, 5).unwrap().resource().cloned();
        let below = below.expect("subsoil holds a resource");

        assert!(game.dig_down().unwrap());

        assert!(game.map().unwrap().get_at(7, 5).unwrap().is_empty());
        let player = game.player().unwrap();
        assert_eq!(player.inventory().count(&below), 1);
        // Dropped into the dug cell, above the next resource
        assert_eq!(player.row(), 7);
    }

    #[test]
    fn test_dig_empty_cell_still_applies_gravity() {
        let (mut game, _) = prepared_game(5);
        clear_cell(&mut game, 7, 5);
        clear_cell(&mut game, 8, 5);

        assert!(!game.dig_down().unwrap());
        assert!(game.player().unwrap().inventory().is_empty());
        assert_eq!(game.player().unwrap().row(), 8);
    }

    #[test]
    fn test_gravity_stops_on_bottom_row() {
        let (mut game, _) = prepared_game(5);
        let player_id = game.player_id().unwrap();
        for row in 7..10 {
            clear_cell(&mut game, row, 5);
        }

        game.apply_gravity(player_id).unwrap();

        assert_eq!(game.player().unwrap().row(), 9);
        assert_eq!(game.entities_at(Position::new(9, 5)), vec![player_id]);
    }

    #[test]
    fn test_gravity_twice_over_alternating_column() {
        let recorder = RecordingView::new();
        let mut game = FlatcraftGame::with_collaborators(
            GenerationConfig::new(15, 10).with_decorations(0, 0),
            Box::new(SpriteCache::with_default_catalog()),
            Box::new(SeededRandom::new(31)),
            Box::new(recorder.clone()),
        );
        game.prepare().unwrap();
        let player_id = game.player_id().unwrap();
        assert_eq!(game.player().unwrap().position(), Position::new(10, 5));
        // Rows 11 and 13 empty, rows 12 and 14 keep their subsoil
        clear_cell(&mut game, 11, 5);
        clear_cell(&mut game, 13, 5);
        recorder.take_events();

        game.apply_gravity(player_id).unwrap();
        assert_eq!(game.player().unwrap().row(), 11);
        assert_eq!(recorder.take_events().len(), 2);

        game.apply_gravity(player_id).unwrap();
        assert_eq!(game.player().unwrap().row(), 11);
        assert!(recorder.events().is_empty());

        assert!(game.dig_down().unwrap());
        assert_eq!(game.player().unwrap().row(), 13);
        game.apply_gravity(player_id).unwrap();
        assert_eq!(game.player().unwrap().row(), 13);
    }

    #[test]
    fn test_dig_sideways() {
        let (mut game, recorder) = prepared_game(21);
        recorder.take_events();

        assert!(game.dig_left().unwrap());
        assert!(game.map().unwrap().get_at(6, 4).unwrap().is_empty());
        assert!(game.dig_right().unwrap());
        assert!(game.map().unwrap().get_at(6, 6).unwrap().is_empty());
        assert_eq!(game.player().unwrap().inventory().total(), 2);

        let updates = recorder
            .events()
            .into_iter()
            .filter(|event| matches!(event, ViewEvent::CellUpdated { .. }))
            .count();
        assert_eq!(updates, 2);
    }

    #[test]
    fn test_dig_left_on_first_column() {
        let (mut game, _) = prepared_game(21);
        for _ in 0..5 {
            game.move_left().unwrap();
        }
        assert!(!game.dig_left().unwrap());
        assert_eq!(game.player().unwrap().column(), 0);
    }

    #[test]
    fn test_gravity_is_idempotent_on_obstruction() {
        let (mut game, recorder) = prepared_game(4);
        let player_id = game.player_id().unwrap();
        recorder.take_events();

        game.apply_gravity(player_id).unwrap();
        let first = game.player().unwrap().position();
        game.apply_gravity(player_id).unwrap();

        assert_eq!(game.player().unwrap().position(), first);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_mob_lifecycle() {
        let (mut game, recorder) = prepared_game(6);
        let mob_id = game.spawn_mob(3, 3, 1).unwrap();
        game.animate_mob(mob_id).unwrap();
        assert!(game.is_animated(mob_id));
        recorder.take_events();

        assert!(game.decrement_health(mob_id).unwrap());

        assert!(game.movable(mob_id).is_none());
        assert!(!game.is_animated(mob_id));
        assert!(game.entities_at(Position::new(3, 3)).is_empty());
        assert!(matches!(
            recorder.events().as_slice(),
            [ViewEvent::MovableRemoved(view)] if view.id == mob_id
        ));
        assert!(game.decrement_health(mob_id).is_err());
    }

    #[test]
    fn test_tick_moves_animated_mobs() {
        let recorder = RecordingView::new();
        let mut game = FlatcraftGame::with_collaborators(
            GenerationConfig::new(10, 10).with_decorations(0, 0),
            Box::new(SpriteCache::with_default_catalog()),
            // Always rolls the highest value: right for mobs
            Box::new(Constant(u32::MAX)),
            Box::new(recorder),
        );
        game.prepare().unwrap();
        let mob_id = game.spawn_mob(2, 3, 2).unwrap();
        let idle_id = game.spawn_mob(2, 7, 2).unwrap();
        game.animate_mob(mob_id).unwrap();

        assert_eq!(game.tick().unwrap(), vec![mob_id]);
        assert_eq!(game.movable(mob_id).unwrap().column(), 4);
        assert_eq!(game.movable(idle_id).unwrap().column(), 7);
        assert_eq!(game.current_tick(), 1);
    }

    #[test]
    fn test_mob_move_period_and_stop() {
        let mut game = FlatcraftGame::with_collaborators(
            GenerationConfig::new(10, 10).with_decorations(0, 0),
            Box::new(SpriteCache::with_default_catalog()),
            Box::new(Constant(0)),
            Box::new(NullView),
        );
        game.prepare().unwrap();
        game.set_mob_move_period(3);
        let mob_id = game.spawn_mob(1, 5, 1).unwrap();
        game.animate_mob(mob_id).unwrap();

        assert!(game.tick().unwrap().is_empty());
        assert!(game.tick().unwrap().is_empty());
        // Always rolls zero: left
        assert_eq!(game.tick().unwrap(), vec![mob_id]);
        assert_eq!(game.movable(mob_id).unwrap().column(), 4);

        assert!(game.stop_mob(mob_id));
        assert!(!game.is_animated(mob_id));
        for _ in 0..6 {
            assert!(game.tick().unwrap().is_empty());
        }
        assert_eq!(game.movable(mob_id).unwrap().column(), 4);
        assert!(!game.stop_mob(mob_id));
    }

    #[test]
    fn test_animate_rejects_player() {
        let (mut game, _) = prepared_game(2);
        let player_id = game.player_id().unwrap();
        assert!(game.animate_mob(player_id).is_err());
    }

    #[test]
    fn test_spawn_mob_validation() {
        let (mut game, _) = prepared_game(2);
        assert!(matches!(
            game.spawn_mob(10, 0, 1),
            Err(FlatcraftError::OutOfBounds { .. })
        ));
        assert!(matches!(
            game.spawn_mob(0, 0, 0),
            Err(FlatcraftError::InvalidState(_))
        ));
    }

    #[test]
    fn test_player_death_ends_player_operations() {
        let (mut game, _) = prepared_game(2);
        let player_id = game.player_id().unwrap();

        assert!(!game.decrement_health(player_id).unwrap());
        game.increment_health(player_id).unwrap();
        assert_eq!(game.player().unwrap().health(), 3);
        for _ in 0..2 {
            assert!(!game.decrement_health(player_id).unwrap());
        }
        assert!(game.decrement_health(player_id).unwrap());

        assert!(game.player().is_none());
        assert!(game.move_right().is_err());
    }

    #[test]
    fn test_snapshot() {
        let (mut game, _) = prepared_game(12345);
        game.spawn_mob(1, 1, 2).unwrap();
        game.dig_down().unwrap();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.soil_height, Some(6));
        assert_eq!(snapshot.mobs.len(), 1);
        let player = snapshot.player.unwrap();
        assert_eq!(player.inventory.values().sum::<u32>(), 1);

        let json = serde_json::to_string(&game.snapshot()).unwrap();
        assert!(json.contains("\"mobs\""));
    }
}
