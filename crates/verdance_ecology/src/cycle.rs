//! # Day Cycle
//!
//! A counter bouncing between 0 and `ticks_per_cycle`:
//!
//! ```text
//!   max ┤      /\        /\
//!       │     /  \      /  \
//!     0 ┤____/    \____/    \__
//! ```
//!
//! Decay is scaled by `multiplier() + 0.5`, so it is strongest at the peak.

use verdance_procedural::Lehmer;

/// Bouncing tick counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayCycle {
    counter: u32,
    max: u32,
    rising: bool,
}

impl DayCycle {
    /// Creates a cycle at `start` (clamped to `max`), rising.
    ///
    /// A `max` of zero is treated as one.
    #[must_use]
    pub fn new(max: u32, start: u32) -> Self {
        let max = max.max(1);
        Self {
            counter: start.min(max),
            max,
            rising: true,
        }
    }

    /// Creates a cycle at a random position in `[0, max)`.
    #[must_use]
    pub fn random(max: u32, rng: &mut Lehmer) -> Self {
        let max = max.max(1);
        // below(max) < max, a u32.
        #[allow(clippy::cast_possible_truncation)]
        let start = rng.below(max as usize) as u32;
        Self::new(max, start)
    }

    /// Current counter.
    #[inline]
    #[must_use]
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Position in the cycle, in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        f64::from(self.counter) / f64::from(self.max)
    }

    /// Moves one tick, reversing direction at either end.
    pub fn advance(&mut self) {
        if self.rising && self.counter >= self.max {
            self.rising = false;
        } else if !self.rising && self.counter == 0 {
            self.rising = true;
        }
        if self.rising {
            self.counter += 1;
        } else {
            self.counter -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounces_between_ends() {
        let mut cycle = DayCycle::new(3, 2);
        let mut seen = Vec::new();
        for _ in 0..8 {
            cycle.advance();
            seen.push(cycle.counter());
        }
        assert_eq!(seen, vec![3, 2, 1, 0, 1, 2, 3, 2]);
    }

    #[test]
    fn test_multiplier_range() {
        let mut cycle = DayCycle::new(480, 0);
        for _ in 0..2000 {
            let m = cycle.multiplier();
            assert!((0.0..=1.0).contains(&m));
            cycle.advance();
        }
    }

    #[test]
    fn test_random_start_in_range() {
        let mut rng = Lehmer::new(1);
        for _ in 0..100 {
            assert!(DayCycle::random(480, &mut rng).counter() < 480);
        }
    }

    #[test]
    fn test_zero_length_does_not_divide_by_zero() {
        let mut cycle = DayCycle::new(0, 0);
        cycle.advance();
        assert!(cycle.multiplier().is_finite());
    }
}
