//! Game balance settings
//!
//! Every tunable the core reads lives here. Defaults reproduce the classic
//! feel; a JSON file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunable game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed for reproducibility
    pub seed: u64,

    // === Pacing ===
    /// Delay before the first pattern is thrown (seconds)
    pub start_delay: f64,
    /// Wait between an empty field and the next pattern (seconds)
    pub initial_popup_time: f64,
    /// Total spread of a chain pattern (seconds)
    pub initial_chain_delay: f64,
    /// Physics world speed at start
    pub initial_world_speed: f64,

    // === Difficulty ramp (applied on every scheduler step) ===
    pub popup_decay: f64,
    pub chain_decay: f64,
    pub world_speed_growth: f64,

    // === Rules ===
    pub starting_lives: u8,
    /// Randomized patterns appended after the warm-up script
    pub random_patterns: usize,
    /// Deferred chain spawns still fire after game over when set
    pub spawns_after_game_over: bool,

    // === Physics hand-off ===
    /// Multiplier from unscaled kinematic ranges to points/second
    pub velocity_scale: f32,
    /// Vertical gravity handed to the physics collaborator
    pub gravity: f32,
    /// Circle body radius for physics and hit testing
    pub body_radius: f32,
    /// Entities below this y are off-screen
    pub offscreen_threshold: f32,

    // === Swipe ===
    pub swipe_capacity: usize,
    /// How long one swoosh cue blocks the next (seconds)
    pub swoosh_duration: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5EED_F00D,

            start_delay: 2.0,
            initial_popup_time: 0.9,
            initial_chain_delay: 3.0,
            initial_world_speed: 0.85,

            popup_decay: 0.991,
            chain_decay: 0.99,
            world_speed_growth: 1.02,

            starting_lives: 3,
            random_patterns: 1000,
            spawns_after_game_over: false,

            velocity_scale: 40.0,
            gravity: -6.0,
            body_radius: 64.0,
            offscreen_threshold: -140.0,

            swipe_capacity: 12,
            swoosh_duration: 0.35,
        }
    }
}

impl Settings {
    /// Default settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> SettingsError {
            SettingsError::Invalid { field, reason }
        }

        let positive_times = [
            ("start_delay", self.start_delay),
            ("initial_popup_time", self.initial_popup_time),
            ("initial_chain_delay", self.initial_chain_delay),
            ("initial_world_speed", self.initial_world_speed),
            ("swoosh_duration", self.swoosh_duration),
        ];
        for (field, value) in positive_times {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be a positive number"));
            }
        }

        for (field, value) in [
            ("popup_decay", self.popup_decay),
            ("chain_decay", self.chain_decay),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(field, "must be in (0, 1]"));
            }
        }
        if !(self.world_speed_growth.is_finite() && self.world_speed_growth >= 1.0) {
            return Err(invalid("world_speed_growth", "must be >= 1"));
        }

        if !(1..=3).contains(&self.starting_lives) {
            return Err(invalid("starting_lives", "must be between 1 and 3"));
        }
        if !(self.velocity_scale.is_finite() && self.velocity_scale > 0.0) {
            return Err(invalid("velocity_scale", "must be positive"));
        }
        if !(self.body_radius.is_finite() && self.body_radius > 0.0) {
            return Err(invalid("body_radius", "must be positive"));
        }
        if !self.offscreen_threshold.is_finite() {
            return Err(invalid("offscreen_threshold", "must be finite"));
        }
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }
        if self.swipe_capacity < 2 {
            return Err(invalid("swipe_capacity", "must hold at least 2 points"));
        }
        Ok(())
    }
}
