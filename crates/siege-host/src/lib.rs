//! Frame-loop host for the siege simulation.
//!
//! Runs `SimulationEngine` on its own thread at the nominal 16 ms tick,
//! forwards commands over an `mpsc` channel and hands every snapshot to a
//! `Presenter`.

pub mod config;
pub mod error;
pub mod game_loop;
pub mod presenter;
pub mod state;

pub use config::HostConfig;
pub use error::HostError;
pub use game_loop::{spawn_game_loop, LoopOptions};
pub use presenter::{LogPresenter, Presenter, StatsPresenter};
pub use state::{GameLoopCommand, GameLoopHandle};
