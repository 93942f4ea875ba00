//! Host configuration, loaded from an optional JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "ticks": 3750, "sim": { "seed": 7, "quality": "Medium" } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use siege_core::constants::TICK_MICROS;
use siege_sim::SimConfig;

use crate::error::HostError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub sim: SimConfig,
    /// Stop after this many ticks. `None` runs until shutdown.
    pub ticks: Option<u64>,
    /// Sleep between ticks to hold the nominal tick rate.
    pub realtime: bool,
    /// Queue `Start` before the first tick.
    pub auto_start: bool,
    /// Ticks between periodic status lines from the log presenter.
    pub log_every_ticks: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            ticks: Some(ticks_in_secs(30)),
            realtime: true,
            auto_start: true,
            log_every_ticks: ticks_in_secs(2),
        }
    }
}

/// Whole ticks in `secs` seconds. The tick is 16 ms, so a second is not a
/// whole number of ticks and the division has to come last.
fn ticks_in_secs(secs: u64) -> u64 {
    secs * 1_000_000 / TICK_MICROS
}

impl HostConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, HostError> {
        let text = fs::read_to_string(path).map_err(|source| HostError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| HostError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HostError> {
        self.sim.validate()?;
        if self.log_every_ticks == 0 {
            return Err(HostError::InvalidConfig(
                "log_every_ticks must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
