//! Sound cue catalogue
//!
//! The core never plays audio itself. It asks the audio collaborator to play
//! cues by id; file names are owned here as configuration constants.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// A target was thrown onto the field
    Launch,
    /// Hazard fuse, played as a loop while a hazard is live
    Fuse,
    /// A target was sliced
    Whack,
    /// A hazard was sliced
    Explosion,
    /// A target escaped and cost a life
    Wrong,
    /// Blade swoosh, one of three variants
    Swoosh(u8),
}

/// Number of swoosh variants shipped with the game
pub const SWOOSH_VARIANTS: u8 = 3;

impl SoundCue {
    /// Asset file name for this cue
    pub fn file_name(&self) -> String {
        match self {
            SoundCue::Launch => "launch.caf".to_string(),
            SoundCue::Fuse => "sliceBombFuse.caf".to_string(),
            SoundCue::Whack => "whack.caf".to_string(),
            SoundCue::Explosion => "explosion.caf".to_string(),
            SoundCue::Wrong => "wrong.caf".to_string(),
            SoundCue::Swoosh(variant) => format!("swoosh{variant}.caf"),
        }
    }

    /// Pick a random swoosh variant (1-based)
    pub fn random_swoosh(rng: &mut impl Rng) -> Self {
        SoundCue::Swoosh(rng.random_range(1..=SWOOSH_VARIANTS))
    }
}

/// Handle to a looping cue, allocated by the core so it can stop it later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoopHandle(pub u32);
