//! Game state, entities and the Playing -> Ended state machine
//!
//! All score, lives and pacing state for one session lives in [`GameState`].
//! Every mutating operation checks the terminal phase first and no-ops once
//! the game has ended.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{Command, GameEvent, Outbox};
use crate::audio::{LoopHandle, SoundCue};
use crate::settings::Settings;

/// Stable entity identifier, allocated in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What a falling object is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Safe, score-granting
    Target,
    /// Game-ending when touched ("bomb")
    Hazard,
}

/// One falling object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Last known position (spawn point until physics reports one)
    pub position: Vec2,
    /// Initial velocity handed to physics (scaled)
    pub velocity: Vec2,
    pub angular_velocity: f32,
    /// False once hit or expired
    pub alive: bool,
    /// Cleared on first hit so later samples ignore the entity
    pub hit_testable: bool,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        position: Vec2,
        velocity: Vec2,
        angular_velocity: f32,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            velocity,
            angular_velocity,
            alive: true,
            hit_testable: true,
        }
    }

    /// Live and still eligible for hit tests
    #[inline]
    pub fn is_hittable(&self) -> bool {
        self.alive && self.hit_testable
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended; nothing else is honored
    Ended { via_hazard: bool },
}

/// Session-scoped mutable record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub score: u64,
    /// Remaining lives, 0..=3
    pub lives: u8,
    /// Index of the next pattern to throw
    pub sequence_position: usize,
    /// Wait between an empty field and the next pattern (seconds)
    pub popup_time: f64,
    /// Spread of chain sub-spawns (seconds)
    pub chain_delay: f64,
    /// Physics world speed multiplier
    pub world_speed: f64,
    /// An advance timer is already pending
    pub next_sequence_queued: bool,
    pub phase: GamePhase,
    /// Currently playing hazard fuse loop
    pub fuse_loop: Option<LoopHandle>,
    next_loop_handle: u32,
}

impl GameState {
    /// Fresh state for a new session
    ///
    /// `next_sequence_queued` starts true: session start-up owns the first
    /// advance, so an empty field must not queue another one before it fires.
    pub fn new(settings: &Settings) -> Self {
        Self {
            seed: settings.seed,
            score: 0,
            lives: settings.starting_lives,
            sequence_position: 0,
            popup_time: settings.initial_popup_time,
            chain_delay: settings.initial_chain_delay,
            world_speed: settings.initial_world_speed,
            next_sequence_queued: true,
            phase: GamePhase::Playing,
            fuse_loop: None,
            next_loop_handle: 1,
        }
    }

    #[inline]
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, GamePhase::Ended { .. })
    }

    /// `Some(via_hazard)` once ended
    pub fn end_cause(&self) -> Option<bool> {
        match self.phase {
            GamePhase::Playing => None,
            GamePhase::Ended { via_hazard } => Some(via_hazard),
        }
    }

    /// Award points
    pub fn add_score(&mut self, points: u64, out: &mut Outbox) {
        if self.is_ended() {
            return;
        }
        self.score += points;
        out.event(GameEvent::ScoreChanged { score: self.score });
    }

    /// A target escaped. Ends the game when the last life goes.
    pub fn lose_life(&mut self, out: &mut Outbox) {
        if self.is_ended() || self.lives == 0 {
            return;
        }
        self.lives -= 1;
        log::debug!("Life lost, {} remaining", self.lives);
        out.command(Command::Play {
            cue: SoundCue::Wrong,
        });
        out.event(GameEvent::LifeLost {
            remaining: self.lives,
        });

        if self.lives == 0 {
            self.end_game(false, out);
        }
    }

    /// Enter the terminal phase. Returns false if already ended.
    pub fn end_game(&mut self, via_hazard: bool, out: &mut Outbox) -> bool {
        if self.is_ended() {
            return false;
        }
        self.phase = GamePhase::Ended { via_hazard };
        self.stop_fuse(out);
        out.command(Command::SetWorldSpeed { speed: 0.0 });
        out.event(GameEvent::GameOver { via_hazard });
        log::info!(
            "Game over ({}): score {}, lives {}, pattern {}",
            if via_hazard { "hazard" } else { "out of lives" },
            self.score,
            self.lives,
            self.sequence_position
        );
        true
    }

    /// Start a fresh fuse loop, replacing any that is playing
    pub fn start_fuse(&mut self, out: &mut Outbox) {
        self.stop_fuse(out);
        let handle = LoopHandle(self.next_loop_handle);
        self.next_loop_handle += 1;
        self.fuse_loop = Some(handle);
        out.command(Command::PlayLoop {
            cue: SoundCue::Fuse,
            handle,
        });
    }

    /// Stop the fuse loop if one is playing
    pub fn stop_fuse(&mut self, out: &mut Outbox) {
        if let Some(handle) = self.fuse_loop.take() {
            out.command(Command::Stop { handle });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (GameState, Outbox) {
        (GameState::new(&Settings::default()), Outbox::default())
    }

    #[test]
    fn test_initial_state() {
        let (state, _) = fresh();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert!(state.next_sequence_queued);
        assert!((state.popup_time - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_add_score() {
        let (mut state, mut out) = fresh();
        state.add_score(1, &mut out);
        state.add_score(2, &mut out);
        assert_eq!(state.score, 3);
        assert_eq!(out.events.last(), Some(&GameEvent::ScoreChanged { score: 3 }));
    }

    #[test]
    fn test_three_lives_lost_ends_game() {
        let (mut state, mut out) = fresh();
        state.lose_life(&mut out);
        state.lose_life(&mut out);
        assert_eq!(state.phase, GamePhase::Playing);
        state.lose_life(&mut out);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::Ended { via_hazard: false });
        assert_eq!(
            out.events,
            vec![
                GameEvent::LifeLost { remaining: 2 },
                GameEvent::LifeLost { remaining: 1 },
                GameEvent::LifeLost { remaining: 0 },
                GameEvent::GameOver { via_hazard: false },
            ]
        );
        assert!(out.commands.contains(&Command::SetWorldSpeed { speed: 0.0 }));
    }

    #[test]
    fn test_hazard_ends_game_with_full_lives() {
        let (mut state, mut out) = fresh();
        assert!(state.end_game(true, &mut out));
        assert_eq!(state.lives, 3);
        assert_eq!(state.end_cause(), Some(true));
    }

    #[test]
    fn test_end_game_is_idempotent() {
        let (mut state, mut out) = fresh();
        assert!(state.end_game(true, &mut out));
        assert!(!state.end_game(false, &mut out));
        assert_eq!(state.phase, GamePhase::Ended { via_hazard: true });
        let game_overs = out
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_frozen_after_end() {
        let (mut state, mut out) = fresh();
        state.add_score(5, &mut out);
        state.end_game(true, &mut out);
        let before = out.clone();
        state.add_score(1, &mut out);
        state.lose_life(&mut out);
        assert_eq!(state.score, 5);
        assert_eq!(state.lives, 3);
        assert_eq!(out, before);
    }

    #[test]
    fn test_fuse_replaced_and_stopped_on_end() {
        let (mut state, mut out) = fresh();
        state.start_fuse(&mut out);
        state.start_fuse(&mut out);
        assert_eq!(state.fuse_loop, Some(LoopHandle(2)));
        assert!(out.commands.contains(&Command::Stop {
            handle: LoopHandle(1)
        }));
        state.end_game(false, &mut out);
        assert_eq!(state.fuse_loop, None);
        assert!(out.commands.contains(&Command::Stop {
            handle: LoopHandle(2)
        }));
    }
}
