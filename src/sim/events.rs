//! Outbound traffic from the core
//!
//! `Command`s are calls on the rendering, audio and physics collaborators.
//! `GameEvent`s are the observable outputs a UI binds to.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{EntityId, EntityKind};
use crate::audio::{LoopHandle, SoundCue};

/// Particle effects the renderer knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Target sliced
    SliceTarget,
    /// Hazard sliced
    SliceHazard,
}

/// A call on one of the collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    // --- Renderer ---
    Present {
        id: EntityId,
        kind: EntityKind,
        position: Vec2,
    },
    Remove {
        id: EntityId,
    },
    PlayEffect {
        effect: EffectKind,
        position: Vec2,
    },
    /// Drawable swipe trail; empty means nothing to draw
    SwipePathChanged {
        points: Vec<Vec2>,
    },
    /// Stroke ended, fade the trail out
    FadeSwipe,

    // --- Audio ---
    Play {
        cue: SoundCue,
    },
    PlayLoop {
        cue: SoundCue,
        handle: LoopHandle,
    },
    Stop {
        handle: LoopHandle,
    },

    // --- Physics ---
    ConfigureWorld {
        gravity: f32,
        speed: f32,
    },
    AssignBody {
        id: EntityId,
        radius: f32,
        collision_mask: u32,
        velocity: Vec2,
        angular_velocity: f32,
    },
    SetWorldSpeed {
        speed: f32,
    },
}

/// Observable game outputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged { score: u64 },
    LifeLost { remaining: u8 },
    GameOver { via_hazard: bool },
}

/// Everything the core produced since the last drain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outbox {
    pub commands: Vec<Command>,
    pub events: Vec<GameEvent>,
}

impl Outbox {
    pub fn command(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty()
    }

    /// Take everything out, leaving the outbox empty
    pub fn take(&mut self) -> Outbox {
        std::mem::take(self)
    }
}
