//! Deterministic random source shared by every battle subsystem.
//!
//! The resolution pipeline and the AI draw from one [`BattleRng`] in a fixed
//! order, so a battle replays exactly given the same seed and inputs.

/// Stateless generator interface: maps a seed to a value.
pub trait RngOracle {
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform float in `[0, 1)`.
    fn unit_f64(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / (f64::from(u32::MAX) + 1.0)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the battle seed with a draw counter into a per-draw seed.
///
/// SplitMix64-style avalanche so consecutive counters give unrelated seeds.
pub fn compute_seed(battle_seed: u64, draw: u64) -> u64 {
    let mut hash = battle_seed;
    hash ^= draw.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}

/// Seeded, counter-based random source.
///
/// Every call consumes exactly one draw, regardless of the probability
/// passed in, so the draw sequence depends only on the call sequence.
#[derive(Clone, Debug)]
pub struct BattleRng {
    seed: u64,
    draws: u64,
    oracle: PcgRng,
}

impl BattleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            oracle: PcgRng,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn next_u32(&mut self) -> u32 {
        let seed = compute_seed(self.seed, self.draws);
        self.draws += 1;
        self.oracle.next_u32(seed)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let seed = compute_seed(self.seed, self.draws);
        self.draws += 1;
        self.oracle.unit_f64(seed)
    }

    /// Returns true with probability `chance` (clamped to `[0, 1]`).
    pub fn roll(&mut self, chance: f64) -> bool {
        let draw = self.next_f64();
        draw < chance.clamp(0.0, 1.0)
    }

    /// Uniform index in `[0, len)`; `len` must be nonzero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u32() as usize) % len.max(1)
    }

    /// Uniform float in `[min, max]`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            // Still consume a draw to keep the sequence aligned.
            self.next_f64();
            return min;
        }
        min + self.next_f64() * (max - min)
    }
}
