//! # View Interface
//!
//! Notifications sent by the game to whatever displays it. The game tells the
//! view when a new map is ready, when a movable appears or disappears, and
//! when a cell changes after digging. Moving an entity is reported as a
//! removal at the old position followed by an addition at the new one.

use crate::{Cell, EntityId, GameMap, Movable, MovableKind, Sprite};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// What the view gets to know about a movable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovableView {
    pub id: EntityId,
    pub kind: MovableKind,
    pub row: i32,
    pub column: i32,
    pub sprite: Sprite,
    pub health: u32,
}

impl MovableView {
    /// Captures the current state of a movable.
    pub fn of<M: Movable + ?Sized>(movable: &M, kind: MovableKind) -> Self {
        Self {
            id: movable.id(),
            kind,
            row: movable.row(),
            column: movable.column(),
            sprite: movable.sprite().clone(),
            health: movable.health(),
        }
    }
}

/// Receiver of the game's display notifications.
pub trait GameView {
    /// A new map is ready to be displayed.
    fn initialize_view(&mut self, map: &GameMap);

    /// A movable appeared at the position it carries.
    fn add_movable_object(&mut self, movable: &MovableView);

    /// A movable left the position it carries.
    fn remove_movable_object(&mut self, movable: &MovableView);

    /// The content of a cell changed.
    fn cell_updated(&mut self, row: i32, column: i32, cell: &Cell) {
        let _ = (row, column, cell);
    }
}

/// View that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl GameView for NullView {
    fn initialize_view(&mut self, _map: &GameMap) {}

    fn add_movable_object(&mut self, _movable: &MovableView) {}

    fn remove_movable_object(&mut self, _movable: &MovableView) {}
}

/// View writing every notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingView;

impl GameView for LoggingView {
    fn initialize_view(&mut self, map: &GameMap) {
        info!(
            "Map ready: {}x{} with soil at row {}",
            map.height(),
            map.width(),
            map.soil_height()
        );
    }

    fn add_movable_object(&mut self, movable: &MovableView) {
        debug!(
            "{:?} {} at ({}, {}) with {} health",
            movable.kind, movable.id, movable.row, movable.column, movable.health
        );
    }

    fn remove_movable_object(&mut self, movable: &MovableView) {
        debug!(
            "{:?} {} left ({}, {})",
            movable.kind, movable.id, movable.row, movable.column
        );
    }

    fn cell_updated(&mut self, row: i32, column: i32, cell: &Cell) {
        debug!(
            "Cell ({}, {}) now holds {:?}",
            row,
            column,
            cell.resource().map(|resource| resource.name())
        );
    }
}

/// A notification as recorded by [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewEvent {
    MapInitialized {
        height: i32,
        width: i32,
        soil_height: i32,
    },
    MovableAdded(MovableView),
    MovableRemoved(MovableView),
    CellUpdated {
        row: i32,
        column: i32,
        resource: Option<String>,
    },
}

/// View keeping the list of notifications it received.
///
/// Clones share the same list, so a clone kept aside can inspect what the
/// game sent to the one it owns.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the notifications received so far.
    pub fn events(&self) -> Vec<ViewEvent> {
        self.lock().clone()
    }

    /// Removes and returns the notifications received so far.
    pub fn take_events(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ViewEvent>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, event: ViewEvent) {
        self.lock().push(event);
    }
}

impl GameView for RecordingView {
    fn initialize_view(&mut self, map: &GameMap) {
        self.record(ViewEvent::MapInitialized {
            height: map.height(),
            width: map.width(),
            soil_height: map.soil_height(),
        });
    }

    fn add_movable_object(&mut self, movable: &MovableView) {
        self.record(ViewEvent::MovableAdded(movable.clone()));
    }

    fn remove_movable_object(&mut self, movable: &MovableView) {
        self.record(ViewEvent::MovableRemoved(movable.clone()));
    }

    fn cell_updated(&mut self, row: i32, column: i32, cell: &Cell) {
        self.record(ViewEvent::CellUpdated {
            row,
            column,
            resource: cell.resource().map(|resource| resource.name().to_string()),
        });
    }
}
