//! Deterministic rolls for the planner.
//!
//! Every roll is a pure function of a seed, so a decision cycle replays
//! identically given the same game seed, turn, combatant and roll counter.

/// Seeded random source.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// 1-100 inclusive.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// `[min, max]` inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = max - min + 1;
        min + (self.next_u32(seed) % span)
    }

    /// `[min, max]` inclusive over signed values.
    fn range_i32(&self, seed: u64, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        (i64::from(min) + (u64::from(self.next_u32(seed)) % span) as i64) as i32
    }

    /// True with probability `1 / n`; always true for `n <= 1`.
    fn one_in(&self, seed: u64, n: i32) -> bool {
        n <= 1 || self.range_i32(seed, 1, n) == 1
    }
}

/// PCG-XSH-RR over a 64-bit state.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the game seed, turn, combatant and per-cycle roll counter.
pub fn compute_seed(game_seed: u64, turn: u32, combatant: u32, roll: u64) -> u64 {
    let mut hash = game_seed;
    hash ^= u64::from(turn).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(combatant).wrapping_mul(0x517cc1b727220a95);
    hash ^= roll.wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}
