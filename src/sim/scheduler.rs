//! Spawn scheduler
//!
//! Walks the pattern sequence one step per `advance`, ramping difficulty and
//! turning each pattern into spawn requests. Chains stagger their extra
//! spawns through deferred requests instead of waiting for a clear field.

use serde::{Deserialize, Serialize};

use super::sequence::{ForceMode, SpawnPattern};
use super::state::GameState;
use crate::settings::Settings;

/// Extra spawns a chain schedules after its immediate one
pub const CHAIN_FOLLOW_UPS: u32 = 4;

/// One spawn to perform, now or after `delay` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub force: ForceMode,
    /// Seconds after the advance call; 0 means immediate
    pub delay: f64,
}

impl SpawnRequest {
    pub fn now(force: ForceMode) -> Self {
        Self { force, delay: 0.0 }
    }

    pub fn later(force: ForceMode, delay: f64) -> Self {
        Self { force, delay }
    }

    pub fn is_immediate(&self) -> bool {
        self.delay <= 0.0
    }
}

/// Owns the pattern sequence and the ramp factors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    sequence: Vec<SpawnPattern>,
    popup_decay: f64,
    chain_decay: f64,
    world_speed_growth: f64,
}

impl SpawnScheduler {
    pub fn new(sequence: Vec<SpawnPattern>, settings: &Settings) -> Self {
        Self {
            sequence,
            popup_decay: settings.popup_decay,
            chain_decay: settings.chain_decay,
            world_speed_growth: settings.world_speed_growth,
        }
    }

    pub fn sequence(&self) -> &[SpawnPattern] {
        &self.sequence
    }

    /// Pattern the next advance would throw
    pub fn upcoming(&self, state: &GameState) -> Option<SpawnPattern> {
        self.sequence.get(state.sequence_position).copied()
    }

    pub fn is_exhausted(&self, state: &GameState) -> bool {
        state.sequence_position >= self.sequence.len()
    }

    /// Throw the next pattern
    ///
    /// No-op (empty result, state untouched) once the game has ended or the
    /// sequence is exhausted.
    pub fn advance(&self, state: &mut GameState) -> Vec<SpawnRequest> {
        if state.is_ended() {
            return Vec::new();
        }
        let Some(pattern) = self.upcoming(state) else {
            log::info!(
                "Pattern sequence exhausted after {} steps, no more spawns",
                state.sequence_position
            );
            return Vec::new();
        };

        state.popup_time *= self.popup_decay;
        state.chain_delay *= self.chain_decay;
        state.world_speed *= self.world_speed_growth;

        let requests = dispatch(pattern, state.chain_delay);
        log::debug!(
            "Pattern {} {:?}: {} spawn(s), popup {:.3}s, chain {:.3}s, speed {:.3}",
            state.sequence_position,
            pattern,
            requests.len(),
            state.popup_time,
            state.chain_delay,
            state.world_speed
        );

        state.sequence_position += 1;
        state.next_sequence_queued = false;
        requests
    }

    /// Decide whether an empty field should queue the next advance
    ///
    /// Returns the delay for a new advance timer, marking it queued so later
    /// empty frames don't stack a second one.
    pub fn retrigger(&self, state: &mut GameState, registry_empty: bool) -> Option<f64> {
        if state.is_ended() || !registry_empty || state.next_sequence_queued {
            return None;
        }
        state.next_sequence_queued = true;
        Some(state.popup_time)
    }
}

/// Spawn requests for a pattern at the current chain delay
pub fn dispatch(pattern: SpawnPattern, chain_delay: f64) -> Vec<SpawnRequest> {
    use ForceMode::*;

    match pattern {
        SpawnPattern::SingleSafe => vec![SpawnRequest::now(Never)],
        SpawnPattern::Single => vec![SpawnRequest::now(Random)],
        SpawnPattern::PairOneBomb => vec![SpawnRequest::now(Never), SpawnRequest::now(Always)],
        SpawnPattern::Pair => vec![SpawnRequest::now(Random); 2],
        SpawnPattern::Triple => vec![SpawnRequest::now(Random); 3],
        SpawnPattern::Quad => vec![SpawnRequest::now(Random); 4],
        SpawnPattern::Chain => chain(chain_delay / 5.0),
        SpawnPattern::FastChain => chain(chain_delay / 10.0),
    }
}

fn chain(step: f64) -> Vec<SpawnRequest> {
    let follow_ups =
        (1..=CHAIN_FOLLOW_UPS).map(|i| SpawnRequest::later(ForceMode::Random, step * i as f64));
    std::iter::once(SpawnRequest::now(ForceMode::Random))
        .chain(follow_ups)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::Outbox;
    use crate::sim::sequence::{WARMUP, build_sequence};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup() -> (SpawnScheduler, GameState) {
        let settings = Settings::default();
        let sequence = build_sequence(settings.random_patterns, &mut Pcg32::seed_from_u64(1));
        (SpawnScheduler::new(sequence, &settings), GameState::new(&settings))
    }

    #[test]
    fn test_warmup_dispatch() {
        let (scheduler, mut state) = setup();
        let counts: Vec<usize> = WARMUP
            .iter()
            .map(|_| scheduler.advance(&mut state).len())
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 2, 3, 1, 5]);
        assert_eq!(state.sequence_position, 7);
        assert!(!state.next_sequence_queued);
    }

    #[test]
    fn test_dispatch_table() {
        use ForceMode::*;

        let cases: [(SpawnPattern, &[ForceMode]); 8] = [
            (SpawnPattern::SingleSafe, &[Never]),
            (SpawnPattern::Single, &[Random]),
            (SpawnPattern::PairOneBomb, &[Never, Always]),
            (SpawnPattern::Pair, &[Random, Random]),
            (SpawnPattern::Triple, &[Random, Random, Random]),
            (SpawnPattern::Quad, &[Random, Random, Random, Random]),
            (SpawnPattern::Chain, &[Random, Random, Random, Random, Random]),
            (SpawnPattern::FastChain, &[Random, Random, Random, Random, Random]),
        ];
        for (pattern, forces) in cases {
            let requests = dispatch(pattern, 3.0);
            let got: Vec<ForceMode> = requests.iter().map(|r| r.force).collect();
            assert_eq!(got, forces, "{pattern:?}");

            let immediate = requests.iter().filter(|r| r.is_immediate()).count();
            let expected = match pattern {
                SpawnPattern::Chain | SpawnPattern::FastChain => 1,
                _ => forces.len(),
            };
            assert_eq!(immediate, expected, "{pattern:?}");
        }
    }

    #[test]
    fn test_pair_one_bomb_forces() {
        let requests = dispatch(SpawnPattern::PairOneBomb, 3.0);
        assert_eq!(
            requests,
            vec![SpawnRequest::now(ForceMode::Never), SpawnRequest::now(ForceMode::Always)]
        );
    }

    #[test]
    fn test_chain_timing() {
        let requests = dispatch(SpawnPattern::Chain, 2.5);
        assert_eq!(requests.len(), 5);
        let delays: Vec<f64> = requests.iter().map(|r| r.delay).collect();
        let expected = [0.0, 0.5, 1.0, 1.5, 2.0];
        for (got, want) in delays.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{delays:?}");
        }
        assert!(requests.iter().all(|r| r.force == ForceMode::Random));
    }

    #[test]
    fn test_fast_chain_timing() {
        let requests = dispatch(SpawnPattern::FastChain, 3.0);
        assert_eq!(requests.len(), 5);
        assert!(requests[0].is_immediate());
        for (i, request) in requests.iter().enumerate().skip(1) {
            assert!((request.delay - 0.3 * i as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_chain_uses_ramped_delay() {
        let (scheduler, mut state) = setup();
        for _ in 0..6 {
            scheduler.advance(&mut state);
        }
        // Seventh warm-up step is the chain
        let requests = scheduler.advance(&mut state);
        let ramped = 3.0 * 0.99f64.powi(7);
        assert!((requests[1].delay - ramped / 5.0).abs() < 1e-9);
        assert!((requests[4].delay - ramped / 5.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_noop_after_end() {
        let (scheduler, mut state) = setup();
        scheduler.advance(&mut state);
        state.end_game(true, &mut Outbox::default());
        let position = state.sequence_position;
        let popup = state.popup_time;
        assert!(scheduler.advance(&mut state).is_empty());
        assert_eq!(state.sequence_position, position);
        assert_eq!(state.popup_time, popup);
    }

    #[test]
    fn test_exhausted_sequence_stops_cleanly() {
        let settings = Settings::default();
        let scheduler = SpawnScheduler::new(WARMUP[..2].to_vec(), &settings);
        let mut state = GameState::new(&settings);
        assert_eq!(scheduler.advance(&mut state).len(), 1);
        assert_eq!(scheduler.advance(&mut state).len(), 1);
        assert!(scheduler.is_exhausted(&state));

        // Empty field queues one last advance, which does nothing
        assert!(scheduler.retrigger(&mut state, true).is_some());
        assert!(scheduler.advance(&mut state).is_empty());
        assert_eq!(state.sequence_position, 2);
        // Still marked queued, so no further timers
        assert_eq!(scheduler.retrigger(&mut state, true), None);
    }

    #[test]
    fn test_retrigger_queues_once() {
        let (scheduler, mut state) = setup();
        // Start-up owns the first advance
        assert_eq!(scheduler.retrigger(&mut state, true), None);
        scheduler.advance(&mut state);

        assert_eq!(scheduler.retrigger(&mut state, false), None);
        let delay = scheduler.retrigger(&mut state, true).unwrap();
        assert!((delay - 0.9 * 0.991).abs() < 1e-12);
        assert!(state.next_sequence_queued);
        assert_eq!(scheduler.retrigger(&mut state, true), None);
    }

    proptest! {
        #[test]
        fn prop_ramp_is_geometric(n in 0usize..300) {
            let (scheduler, mut state) = setup();
            for _ in 0..n {
                scheduler.advance(&mut state);
            }
            let n = n as i32;
            prop_assert!((state.popup_time - 0.9 * 0.991f64.powi(n)).abs() < 1e-9);
            prop_assert!((state.chain_delay - 3.0 * 0.99f64.powi(n)).abs() < 1e-9);
            let speed = 0.85 * 1.02f64.powi(n);
            prop_assert!((state.world_speed - speed).abs() < 1e-6 * speed);
            prop_assert_eq!(state.sequence_position, n as usize);
        }
    }
}
