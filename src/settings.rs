//! Runtime settings for a simulation run
//!
//! Loaded from a JSON file; any field left out takes its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DT, MAX_FRAME_DT, STARTING_LIVES};
use crate::error::{self, Error, Result};

/// Largest frame cap we accept; anything bigger destabilizes collision
const MAX_FRAME_DT_LIMIT: f32 = 0.25;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for the run
    pub seed: u64,
    pub starting_lives: u8,

    // === Timing ===
    /// Upper bound on a single tick's dt (seconds)
    pub max_frame_dt: f32,
    /// Step used by the headless runner (seconds)
    pub fixed_dt: f32,
    /// How long the headless runner plays (simulated seconds)
    pub run_seconds: f32,

    // === Content ===
    /// Campaign JSON; the built-in campaign when unset
    pub levels_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            starting_lives: STARTING_LIVES,

            max_frame_dt: MAX_FRAME_DT,
            fixed_dt: DEFAULT_DT,
            run_seconds: 60.0,

            levels_path: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Self::from_json(&error::read_to_string(path)?)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_frame_dt > 0.0 && self.max_frame_dt <= MAX_FRAME_DT_LIMIT) {
            return Err(Error::InvalidSettings(format!(
                "max_frame_dt must be in (0, {MAX_FRAME_DT_LIMIT}], got {}",
                self.max_frame_dt
            )));
        }
        if !(self.fixed_dt > 0.0) {
            return Err(Error::InvalidSettings(format!(
                "fixed_dt must be positive, got {}",
                self.fixed_dt
            )));
        }
        if self.run_seconds < 0.0 || !self.run_seconds.is_finite() {
            return Err(Error::InvalidSettings(format!(
                "run_seconds must be a non-negative number, got {}",
                self.run_seconds
            )));
        }
        if self.starting_lives == 0 {
            return Err(Error::InvalidSettings("starting_lives must be at least 1".into()));
        }
        Ok(())
    }

    /// Number of fixed steps in a full run
    pub fn total_ticks(&self) -> u64 {
        (self.run_seconds / self.fixed_dt).ceil() as u64
    }
}
