//! # Game Session
//!
//! Runs a [`FlatcraftGame`] on its own task and drives it through messages.
//!
//! The session task owns the game; every other task talks to it through a
//! cloneable [`SessionHandle`]. Commands are applied one at a time in the
//! order they arrive, so player actions and mob ticks never interleave.

use crate::{Direction, EntityId, FlatcraftError, FlatcraftGame, FlatcraftResult, GameSnapshot};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands buffered before senders have to wait.
const COMMAND_BUFFER: usize = 32;

/// A player or game-master action applied to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Dig(Direction),
    Damage(EntityId),
    Heal(EntityId),
}

impl Action {
    /// Applies the action.
    ///
    /// Moves and digs report whether they succeeded, damage whether the
    /// entity was removed. Healing always reports `true`.
    pub fn apply(self, game: &mut FlatcraftGame) -> FlatcraftResult<bool> {
        match self {
            Action::MoveLeft => game.move_left(),
            Action::MoveRight => game.move_right(),
            Action::Dig(direction) => game.dig(direction),
            Action::Damage(entity_id) => game.decrement_health(entity_id),
            Action::Heal(entity_id) => game.increment_health(entity_id).map(|()| true),
        }
    }
}

/// Messages accepted by the session task.
#[derive(Debug)]
pub enum Command {
    Perform {
        action: Action,
        reply: oneshot::Sender<FlatcraftResult<bool>>,
    },
    Tick {
        reply: oneshot::Sender<FlatcraftResult<Vec<EntityId>>>,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    Shutdown,
}

/// Owner of the game while the session runs.
pub struct GameSession {
    game: FlatcraftGame,
    commands: mpsc::Receiver<Command>,
}

impl GameSession {
    /// Moves the game onto a new task.
    ///
    /// The task ends on [`SessionHandle::shutdown`] or once every handle is
    /// dropped, and gives the game back through the join handle.
    pub fn spawn(game: FlatcraftGame) -> (SessionHandle, JoinHandle<FlatcraftGame>) {
        let (sender, commands) = mpsc::channel(COMMAND_BUFFER);
        let session = Self { game, commands };
        let task = tokio::spawn(session.run());
        (SessionHandle { sender }, task)
    }

    async fn run(mut self) -> FlatcraftGame {
        info!("Game session started");
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Perform { action, reply } => {
                    let result = action.apply(&mut self.game);
                    if let Err(error) = &result {
                        warn!("{:?} rejected: {}", action, error);
                    }
                    let _ = reply.send(result);
                }
                Command::Tick { reply } => {
                    let _ = reply.send(self.game.tick());
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.game.snapshot());
                }
                Command::Shutdown => break,
            }
        }
        info!("Game session stopped at tick {}", self.game.current_tick());
        self.game
    }
}

/// Cloneable access to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Applies an action and waits for its result.
    pub async fn perform(&self, action: Action) -> FlatcraftResult<bool> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Perform { action, reply }).await?;
        response.await.map_err(|_| FlatcraftError::SessionClosed)?
    }

    pub async fn move_left(&self) -> FlatcraftResult<bool> {
        self.perform(Action::MoveLeft).await
    }

    pub async fn move_right(&self) -> FlatcraftResult<bool> {
        self.perform(Action::MoveRight).await
    }

    pub async fn dig(&self, direction: Direction) -> FlatcraftResult<bool> {
        self.perform(Action::Dig(direction)).await
    }

    /// Advances the mob timers by one tick.
    pub async fn tick(&self) -> FlatcraftResult<Vec<EntityId>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Tick { reply }).await?;
        response.await.map_err(|_| FlatcraftError::SessionClosed)?
    }

    pub async fn snapshot(&self) -> FlatcraftResult<GameSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| FlatcraftError::SessionClosed)
    }

    /// Asks the session to stop after the commands already queued.
    pub async fn shutdown(&self) -> FlatcraftResult<()> {
        self.send(Command::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, command: Command) -> FlatcraftResult<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| FlatcraftError::SessionClosed)
    }
}

/// Ticks a session every `period` until it closes.
///
/// The ticker does not keep the session alive: it only holds a weak sender,
/// so the session still ends once every [`SessionHandle`] is dropped.
pub fn spawn_ticker(handle: SessionHandle, period: Duration) -> JoinHandle<()> {
    let sender = handle.sender.downgrade();
    drop(handle);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let handle = match sender.upgrade() {
                Some(sender) => SessionHandle { sender },
                None => break,
            };
            match handle.tick().await {
                Ok(_) => {}
                Err(FlatcraftError::SessionClosed) => break,
                Err(error) => warn!("Mob tick failed: {}", error),
            }
        }
        debug!("Ticker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationConfig, Movable};

    fn prepared_game() -> FlatcraftGame {
        let config = GenerationConfig::new(10, 10)
            .with_decorations(0, 0)
            .with_seed(7);
        let mut game = FlatcraftGame::new(config);
        game.prepare().unwrap();
        game
    }

    #[tokio::test]
    async fn test_session_applies_actions() {
        let (handle, task) = GameSession::spawn(prepared_game());

        assert!(handle.move_left().await.unwrap());
        assert!(handle.dig(Direction::Down).await.unwrap());

        let snapshot = handle.snapshot().await.unwrap();
        let player = snapshot.player.unwrap();
        assert_eq!(player.movable.column, 4);
        assert_eq!(player.inventory.values().sum::<u32>(), 1);

        handle.shutdown().await.unwrap();
        let game = task.await.unwrap();
        assert_eq!(game.player().unwrap().column(), 4);
    }

    #[tokio::test]
    async fn test_session_reports_action_errors() {
        let (handle, _task) = GameSession::spawn(prepared_game());
        let unknown = crate::new_entity_id();

        let result = handle.perform(Action::Damage(unknown)).await;
        assert!(matches!(result, Err(FlatcraftError::InvalidState(_))));
        // The session survives a failed action
        assert!(handle.move_right().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_session() {
        let (handle, task) = GameSession::spawn(prepared_game());
        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(handle.is_closed());
        assert!(matches!(
            handle.snapshot().await,
            Err(FlatcraftError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_ticker_drives_mobs() {
        let mut game = prepared_game();
        let mob_id = game.spawn_mob(2, 5, 1).unwrap();
        game.animate_mob(mob_id).unwrap();
        let (handle, task) = GameSession::spawn(game);

        let ticker = spawn_ticker(handle.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown().await.unwrap();

        let game = task.await.unwrap();
        ticker.await.unwrap();
        assert!(game.current_tick() >= 1);
        assert!(game.movable(mob_id).is_some());
    }

    #[tokio::test]
    async fn test_ticker_does_not_keep_session_alive() {
        let (handle, task) = GameSession::spawn(prepared_game());
        let ticker = spawn_ticker(handle.clone(), Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(handle);

        let game = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("session ends without handles")
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), ticker)
            .await
            .expect("ticker stops with the session")
            .unwrap();
        assert!(game.current_tick() >= 1);
    }

    #[test]
    fn test_session_on_blocking_runtime() {
        tokio_test::block_on(async {
            let (handle, task) = GameSession::spawn(prepared_game());
            assert_eq!(handle.tick().await.unwrap(), Vec::<EntityId>::new());
            drop(handle);
            let game = task.await.unwrap();
            assert_eq!(game.current_tick(), 1);
        });
    }
}
