//! Host and player commands sent to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All possible external actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Simulation control ---
    /// Begin the siege.
    Start,
    /// Freeze time and entities.
    Pause,
    /// Continue after `Pause`.
    Resume,
    /// Tear down every pool and return to `Idle`.
    Reset,

    // --- Defender fire ---
    /// Launch defender missiles toward `direction`.
    FireMissiles {
        direction: Vec3,
        #[serde(default)]
        spread: MissileSpread,
    },
    /// Sweep the defender's hit-scan beam along `direction`.
    FireBeam { direction: Vec3 },

    // --- Settings ---
    SetDoctrine { doctrine: Doctrine },
    SetQuality { quality: Quality },
}
