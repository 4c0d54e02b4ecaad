//! Entity kinematics randomization
//!
//! Picks an entity's kind, start point and launch velocity. Horizontal
//! velocity is zoned by start x so throws fan in toward the center.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sequence::ForceMode;
use super::state::EntityKind;
use crate::consts::*;

/// Unscaled launch parameters for one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnDescriptor {
    pub kind: EntityKind,
    /// Start point; x in 64..=960, y just off the bottom edge
    pub position: Vec2,
    /// Horizontal speed in unscaled integer units
    pub x_velocity: i32,
    /// Upward speed in unscaled integer units
    pub y_velocity: i32,
    pub angular_velocity: f32,
}

impl SpawnDescriptor {
    /// Velocity in points/second for the physics collaborator
    pub fn scaled_velocity(&self, scale: f32) -> Vec2 {
        Vec2::new(self.x_velocity as f32, self.y_velocity as f32) * scale
    }
}

/// Roll the entity type: 0 is a hazard, anything else a target
pub fn roll_kind(force: ForceMode, rng: &mut impl Rng) -> EntityKind {
    let roll = match force {
        ForceMode::Always => 0,
        ForceMode::Never => 1,
        ForceMode::Random => rng.random_range(0..=KIND_ROLL_MAX),
    };
    if roll == 0 {
        EntityKind::Hazard
    } else {
        EntityKind::Target
    }
}

/// Horizontal speed for a start x, toward the center
pub fn zoned_x_velocity(x: i32, rng: &mut impl Rng) -> i32 {
    let (fast_min, fast_max) = FAST_X_SPEED;
    let (slow_min, slow_max) = SLOW_X_SPEED;
    if x < ZONE_FAR_LEFT_END {
        rng.random_range(fast_min..=fast_max)
    } else if x < ZONE_MID_LEFT_END {
        rng.random_range(slow_min..=slow_max)
    } else if x < ZONE_MID_RIGHT_END {
        -rng.random_range(slow_min..=slow_max)
    } else {
        -rng.random_range(fast_min..=fast_max)
    }
}

/// Produce one entity descriptor. No side effects beyond the RNG draw.
pub fn spawn(force: ForceMode, rng: &mut impl Rng) -> SpawnDescriptor {
    let kind = roll_kind(force, rng);
    let x = rng.random_range(SPAWN_X_MIN..=SPAWN_X_MAX);
    let angular_velocity = rng.random_range(-ANGULAR_STEPS..=ANGULAR_STEPS) as f32 / 2.0;
    let x_velocity = zoned_x_velocity(x, rng);
    let (y_min, y_max) = Y_SPEED;
    let y_velocity = rng.random_range(y_min..=y_max);

    SpawnDescriptor {
        kind,
        position: Vec2::new(x as f32, SPAWN_Y),
        x_velocity,
        y_velocity,
        angular_velocity,
    }
}
