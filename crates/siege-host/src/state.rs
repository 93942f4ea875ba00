//! State shared between the host and the game loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use siege_core::commands::PlayerCommand;
use siege_core::state::GameStateSnapshot;

use crate::error::HostError;

/// Commands sent from the host to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Owning handle to a running game loop.
///
/// The presenter moves into the loop thread and comes back out of `join`.
pub struct GameLoopHandle<P> {
    command_tx: mpsc::Sender<GameLoopCommand>,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    thread: JoinHandle<P>,
}

impl<P> GameLoopHandle<P> {
    pub(crate) fn new(
        command_tx: mpsc::Sender<GameLoopCommand>,
        latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
        thread: JoinHandle<P>,
    ) -> Self {
        Self {
            command_tx,
            latest_snapshot,
            thread,
        }
    }

    /// Forward a player command. Returns `false` once the loop has stopped.
    pub fn send(&self, command: PlayerCommand) -> bool {
        self.command_tx
            .send(GameLoopCommand::PlayerCommand(command))
            .is_ok()
    }

    /// Clone of the most recent snapshot, if a tick has run.
    pub fn latest(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Ask the loop to stop after its current tick.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
    }

    /// Wait for the loop to stop and take the presenter back.
    ///
    /// The command channel stays open while waiting, so an unbounded loop
    /// only returns here after `shutdown`.
    pub fn join(self) -> Result<P, HostError> {
        let Self {
            command_tx, thread, ..
        } = self;
        let result = thread.join();
        drop(command_tx);
        result.map_err(|_| HostError::LoopPanicked)
    }
}
