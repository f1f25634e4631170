use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform randomness for every engine decision.
///
/// All helpers derive from [`next_f64`](Self::next_f64), so a scripted source
/// controls every branch the engine takes.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform value in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index on empty range");
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }

    /// Index chosen proportionally to `weights`. Falls back to a uniform pick
    /// when every weight is zero.
    fn pick_weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return self.pick_index(weights.len());
        }
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            let w = w.max(0.0);
            if roll < w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }
}

/// Production source backed by a seedable `SmallRng`.
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_os() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed sequence of rolls, then repeats `fallback` forever.
///
/// Lets tests pin the exact branch taken by probabilistic code.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    rolls: VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

impl ScriptedRandom {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 0.5,
            consumed: 0,
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([]).with_fallback(value)
    }

    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = value;
        self
    }

    /// Number of rolls drawn so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.consumed += 1;
        self.rolls
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_is_deterministic() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..20 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn seeded_stays_in_unit_interval() {
        let mut r = SeededRandom::new(7);
        for _ in 0..1000 {
            let v = r.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn scripted_replays_then_falls_back() {
        let mut r = ScriptedRandom::new([0.1, 0.9]).with_fallback(0.3);
        assert_eq!(r.next_f64(), 0.1);
        assert_eq!(r.next_f64(), 0.9);
        assert_eq!(r.next_f64(), 0.3);
        assert_eq!(r.consumed(), 3);
    }

    #[test]
    fn pick_index_covers_bounds() {
        let mut low = ScriptedRandom::constant(0.0);
        let mut high = ScriptedRandom::constant(1.0);
        assert_eq!(low.pick_index(5), 0);
        assert_eq!(high.pick_index(5), 4);
    }

    #[test]
    fn pick_weighted_respects_weights() {
        let mut r = ScriptedRandom::new([0.1, 0.5, 0.95]);
        let weights = [1.0, 0.0, 3.0];
        assert_eq!(r.pick_weighted(&weights), 0);
        assert_eq!(r.pick_weighted(&weights), 2);
        assert_eq!(r.pick_weighted(&weights), 2);
    }

    #[test]
    fn pick_weighted_zero_weights_is_uniform() {
        let mut r = ScriptedRandom::constant(0.6);
        assert_eq!(r.pick_weighted(&[0.0, 0.0]), 1);
    }

    #[test]
    fn chance_is_strict() {
        let mut r = ScriptedRandom::new([0.4, 0.4]);
        assert!(r.chance(0.41));
        assert!(!r.chance(0.4));
    }
}
