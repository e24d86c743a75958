//! # Seeds and the Lehmer Generator
//!
//! Fast 128-bit multiplicative congruential generator.
//!
//! ## Determinism Guarantee
//!
//! Given the same seed, [`Lehmer`] produces **exactly** the same sequence on
//! any platform, any time. It is not cryptographic.
//!
//! ```text
//! state  = state * 0xda942042e4dd58b5   (mod 2^128)
//! output = state >> 64
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

/// Purpose tag for terrain generation streams.
pub const PURPOSE_GENERATION: u64 = 0x6765_6e65;
/// Purpose tag for the ecology simulator stream.
pub const PURPOSE_SIMULATION: u64 = 0x7369_6d75;
/// Purpose tag for the stream that draws reset seeds.
pub const PURPOSE_RESET: u64 = 0x7265_7365;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Seed taken from the wall clock, for runs without a configured seed.
    #[must_use]
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        // Keep the fast-moving low bits.
        #[allow(clippy::cast_possible_truncation)]
        Self(nanos as u64 ^ (nanos >> 64) as u64)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., simulation).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// A generator seeded from this seed.
    #[inline]
    #[must_use]
    pub fn rng(self) -> Lehmer {
        Lehmer::new(self.0)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x5EED_0F_6A1A_C71C)
    }
}

const MULTIPLIER: u128 = 0xda94_2042_e4dd_58b5;

/// 128-bit Lehmer generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lehmer {
    state: u128,
}

impl Lehmer {
    /// Creates a generator from a 64-bit seed.
    ///
    /// The seed is spread over 128 bits with splitmix64 and forced odd, so
    /// the state can never be zero.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let low = splitmix64(seed);
        let high = splitmix64(low);
        Self {
            state: ((u128::from(high) << 64) | u128::from(low)) | 1,
        }
    }

    /// Next value in `[0, 2^63 - 1]` (the high 63 bits of the output).
    #[inline]
    pub fn next63(&mut self) -> u64 {
        self.next_u64() >> 1
    }

    /// Uniform-ish index in `0..n` (`next63 % n`).
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    #[inline]
    pub fn below(&mut self, n: usize) -> usize {
        assert!(n > 0, "Lehmer::below called with n == 0");
        // The remainder is smaller than n, which fits in usize.
        #[allow(clippy::cast_possible_truncation)]
        let index = (self.next63() % n as u64) as usize;
        index
    }
}

impl RngCore for Lehmer {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        // High bits are the best bits of an MCG.
        #[allow(clippy::cast_possible_truncation)]
        let value = (self.next_u64() >> 32) as u32;
        value
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(MULTIPLIER);
        #[allow(clippy::cast_possible_truncation)]
        let value = (self.state >> 64) as u64;
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[inline]
const fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
