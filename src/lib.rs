//! Slice Rush - logic core for a "slice the falling target" arcade game
//!
//! Core modules:
//! - `sim`: Deterministic gameplay logic (spawn sequencing, kinematics, hits, game state)
//! - `settings`: Tunable game balance, loaded from JSON
//! - `audio`: Sound cue catalogue handed to the audio collaborator
//!
//! Rendering, audio playback and physics integration are collaborators. The core
//! only emits [`sim::Command`]s for them and consumes their feedback.

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};
pub use sim::{Outbox, Session};

use glam::Vec2;

/// Fixed playfield geometry
pub mod consts {
    /// Playfield width (logical points)
    pub const FIELD_WIDTH: f32 = 1024.0;
    /// Playfield height (logical points)
    pub const FIELD_HEIGHT: f32 = 768.0;

    /// Spawn x range (inclusive)
    pub const SPAWN_X_MIN: i32 = 64;
    pub const SPAWN_X_MAX: i32 = 960;
    /// Entities start just below the bottom edge
    pub const SPAWN_Y: f32 = -128.0;

    /// Horizontal velocity zones, by starting x
    pub const ZONE_FAR_LEFT_END: i32 = 256;
    pub const ZONE_MID_LEFT_END: i32 = 512;
    pub const ZONE_MID_RIGHT_END: i32 = 768;

    /// Unscaled horizontal speed ranges (inclusive)
    pub const FAST_X_SPEED: (i32, i32) = (8, 15);
    pub const SLOW_X_SPEED: (i32, i32) = (3, 5);
    /// Unscaled upward speed range (inclusive)
    pub const Y_SPEED: (i32, i32) = (24, 32);
    /// Angular velocity is drawn from -6..=6 then halved
    pub const ANGULAR_STEPS: i32 = 6;

    /// Scripted warm-up length at the head of every sequence
    pub const WARMUP_LEN: usize = 7;
    /// Upper bound of the entity type roll (0 = hazard, anything else = target)
    pub const KIND_ROLL_MAX: u32 = 6;
}

/// True if `point` lies inside the visible playfield
#[inline]
pub fn on_screen(point: Vec2) -> bool {
    point.x >= 0.0
        && point.x <= consts::FIELD_WIDTH
        && point.y >= 0.0
        && point.y <= consts::FIELD_HEIGHT
}
