//! Host startup and shutdown errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use siege_core::error::SimError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid host configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("failed to spawn game loop thread: {0}")]
    SpawnThread(#[source] io::Error),

    #[error("game loop thread panicked")]
    LoopPanicked,
}
