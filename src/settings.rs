//! Simulation tuning and preferences
//!
//! Loaded from a JSON file; any field left out falls back to the defaults in
//! [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// What the loop clock does with the sub-quantum remainder of each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RemainderPolicy {
    /// Keep the remainder for the next frame (no drift)
    #[default]
    Carry,
    /// Store the raw timestamp and lose the remainder every frame
    Drop,
}

impl RemainderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemainderPolicy::Carry => "Carry",
            RemainderPolicy::Drop => "Drop",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "carry" => Some(RemainderPolicy::Carry),
            "drop" | "legacy" => Some(RemainderPolicy::Drop),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Viewport ===
    pub viewport_width: f64,
    pub viewport_height: f64,

    // === Loop ===
    /// Length of one simulation step in nanoseconds
    pub step_nanos: u64,
    pub remainder_policy: RemainderPolicy,

    // === Player ===
    pub player_width: f64,
    pub player_height: f64,
    /// Spawn point in viewport space
    pub spawn_x: f64,
    pub spawn_y: f64,

    // === Physics (per step) ===
    pub move_speed: f64,
    pub jump_speed: f64,
    pub gravity: f64,
    pub max_fall_speed: f64,
    pub ground_tolerance: f64,

    // === Finish condition ===
    pub finish_ceiling_epsilon: f64,
    pub finish_height_factor: f64,

    // === HUD ===
    /// Terms used by the progress estimate
    pub progress_iterations: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: SCREEN_WIDTH,
            viewport_height: SCREEN_HEIGHT,

            step_nanos: STEP_NANOS,
            remainder_policy: RemainderPolicy::Carry,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            spawn_x: PLAYER_SPAWN_X,
            spawn_y: PLAYER_SPAWN_Y,

            move_speed: MOVE_SPEED,
            jump_speed: JUMP_SPEED,
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            ground_tolerance: GROUND_TOLERANCE,

            finish_ceiling_epsilon: FINISH_CEILING_EPSILON,
            finish_height_factor: FINISH_HEIGHT_FACTOR,

            progress_iterations: PROGRESS_ITERATIONS,
        }
    }
}

impl Settings {
    /// Settings for a given viewport, everything else default
    pub fn with_viewport(width: f64, height: f64) -> Self {
        let mut settings = Self::default();
        settings.viewport_width = width;
        settings.viewport_height = height;
        settings.spawn_y = height - PLATFORM_BLOCK_HEIGHT - 30.0;
        settings
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(field: &'static str, value: f64) -> Result<(), SettingsError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        positive("viewport_width", self.viewport_width)?;
        positive("viewport_height", self.viewport_height)?;
        positive("player_width", self.player_width)?;
        positive("player_height", self.player_height)?;
        positive("move_speed", self.move_speed)?;
        positive("max_fall_speed", self.max_fall_speed)?;

        if self.step_nanos == 0 {
            return Err(SettingsError::Invalid {
                field: "step_nanos",
                reason: "must be non-zero",
            });
        }
        if self.progress_iterations == 0 {
            return Err(SettingsError::Invalid {
                field: "progress_iterations",
                reason: "must be non-zero",
            });
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "gravity",
                reason: "must be zero or positive",
            });
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults on any failure
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load_from(path) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Ignoring settings at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
