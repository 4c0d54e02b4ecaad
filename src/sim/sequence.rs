//! Spawn pattern script
//!
//! A session throws patterns in a fixed order: a short warm-up script that
//! teaches the player, then a long randomized tail biased toward multi-spawns.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::WARMUP_LEN;

/// One scripted spawn instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnPattern {
    SingleSafe,
    Single,
    PairOneBomb,
    Pair,
    Triple,
    Quad,
    Chain,
    FastChain,
}

impl SpawnPattern {
    /// All patterns, in index order
    pub const ALL: [SpawnPattern; 8] = [
        SpawnPattern::SingleSafe,
        SpawnPattern::Single,
        SpawnPattern::PairOneBomb,
        SpawnPattern::Pair,
        SpawnPattern::Triple,
        SpawnPattern::Quad,
        SpawnPattern::Chain,
        SpawnPattern::FastChain,
    ];

    /// First index eligible for the randomized tail (skips the singles)
    pub const RANDOM_MIN_INDEX: usize = 2;
}

/// Whether a spawn must, must not, or may be a hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceMode {
    Never,
    Always,
    Random,
}

/// Warm-up script at the head of every sequence
pub const WARMUP: [SpawnPattern; WARMUP_LEN] = [
    SpawnPattern::SingleSafe,
    SpawnPattern::SingleSafe,
    SpawnPattern::PairOneBomb,
    SpawnPattern::PairOneBomb,
    SpawnPattern::Triple,
    SpawnPattern::Single,
    SpawnPattern::Chain,
];

/// Build the full pattern sequence for one session
pub fn build_sequence(random_patterns: usize, rng: &mut impl Rng) -> Vec<SpawnPattern> {
    let mut sequence = Vec::with_capacity(WARMUP_LEN + random_patterns);
    sequence.extend_from_slice(&WARMUP);
    let tail = &SpawnPattern::ALL[SpawnPattern::RANDOM_MIN_INDEX..];
    sequence.extend((0..random_patterns).map(|_| tail[rng.random_range(0..tail.len())]));
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_default_sequence_shape() {
        let mut rng = Pcg32::seed_from_u64(1);
        let sequence = build_sequence(1000, &mut rng);
        assert_eq!(sequence.len(), 1007);
        assert_eq!(&sequence[..7], &WARMUP);
        assert_eq!(
            &sequence[..7],
            &[
                SpawnPattern::SingleSafe,
                SpawnPattern::SingleSafe,
                SpawnPattern::PairOneBomb,
                SpawnPattern::PairOneBomb,
                SpawnPattern::Triple,
                SpawnPattern::Single,
                SpawnPattern::Chain,
            ]
        );
    }

    #[test]
    fn test_tail_covers_every_eligible_pattern() {
        let mut rng = Pcg32::seed_from_u64(9);
        let sequence = build_sequence(1000, &mut rng);
        for pattern in &SpawnPattern::ALL[SpawnPattern::RANDOM_MIN_INDEX..] {
            assert!(sequence[WARMUP_LEN..].contains(pattern), "{pattern:?} never drawn");
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = build_sequence(200, &mut Pcg32::seed_from_u64(77));
        let b = build_sequence(200, &mut Pcg32::seed_from_u64(77));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_tail_never_contains_singles(seed in any::<u64>(), n in 0usize..300) {
            let sequence = build_sequence(n, &mut Pcg32::seed_from_u64(seed));
            prop_assert_eq!(sequence.len(), WARMUP_LEN + n);
            for pattern in &sequence[WARMUP_LEN..] {
                prop_assert!(!matches!(pattern, SpawnPattern::SingleSafe | SpawnPattern::Single));
            }
        }
    }
}
