//! Siege simulation engine.
//!
//! Owns the hecs world, runs the tick pipeline at a fixed step and
//! produces `GameStateSnapshot`s for the presentation layer.

pub mod engine;
pub mod ledger;
pub mod registry;
pub mod schedule;
pub mod systems;

pub use engine::{SimConfig, SimulationEngine};
pub use siege_core as core;

#[cfg(test)]
mod tests;
