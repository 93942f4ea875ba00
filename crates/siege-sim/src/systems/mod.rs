//! Per-tick systems, run by the engine in pipeline order:
//! spawner, behavior, weapons, ballistics, collision, cleanup.
//!
//! Systems are free functions over the registry. They own no state beyond
//! what the engine passes in explicitly.

pub mod ballistics;
pub mod behavior;
pub mod cleanup;
pub mod collision;
pub mod formations;
pub mod snapshot;
pub mod spawner;
pub mod weapons;
