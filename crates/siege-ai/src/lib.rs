//! Ship AI for the siege simulation.
//!
//! Implements the per-archetype behavior state machines, formation
//! geometry and ship/weapon profiles.

pub mod fsm;
pub mod geometry;
pub mod profiles;

pub use siege_core as core;
