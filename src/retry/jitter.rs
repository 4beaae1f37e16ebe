//! Random source for delay jitter.

use std::fmt;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Where the uniform `[0, 1)` sample used for jitter comes from.
///
/// The sample `u` moves the capped delay by `capped * 0.25 * (u - 0.5)`, so a
/// sample of `0.5` leaves the delay unchanged.
///
/// # Examples
///
/// ```rust
/// use rebound::Jitter;
///
/// // Reproducible delays for tests
/// let seeded = Jitter::seeded(7);
/// let again = Jitter::seeded(7);
/// assert_eq!(seeded.sample(), again.sample());
///
/// // Exact delays, no randomness at all
/// assert_eq!(Jitter::None.sample(), 0.5);
/// ```
#[derive(Clone, Default)]
pub enum Jitter {
    /// Per-thread RNG; safe to share across concurrent retries.
    #[default]
    Random,
    /// Deterministic RNG shared by every clone of the policy.
    Seeded(Arc<Mutex<StdRng>>),
    /// Always the given sample, clamped into `[0, 1)`.
    Fixed(f64),
    /// No jitter; delays are exactly the capped exponential value.
    None,
}

impl Jitter {
    /// A deterministic source seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(Arc::new(Mutex::new(StdRng::seed_from_u64(seed))))
    }

    /// Draw a sample in `[0, 1)`.
    pub fn sample(&self) -> f64 {
        match self {
            Self::Random => rand::rng().random::<f64>(),
            Self::Seeded(rng) => match rng.lock() {
                Ok(mut rng) => rng.random::<f64>(),
                // A poisoned RNG still produces valid numbers.
                Err(poisoned) => poisoned.into_inner().random::<f64>(),
            },
            Self::Fixed(u) => clamp_unit(*u),
            Self::None => 0.5,
        }
    }
}

fn clamp_unit(u: f64) -> f64 {
    if u.is_nan() {
        0.5
    } else {
        u.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

impl fmt::Debug for Jitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "Random"),
            Self::Seeded(_) => write!(f, "Seeded(..)"),
            Self::Fixed(u) => f.debug_tuple("Fixed").field(u).finish(),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod jitter_tests {
    use super::*;

    #[test]
    fn test_random_samples_in_unit_interval() {
        let jitter = Jitter::Random;
        for _ in 0..1000 {
            let u = jitter.sample();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = Jitter::seeded(42);
        let b = Jitter::seeded(42);
        let first: Vec<f64> = (0..5).map(|_| a.sample()).collect();
        let second: Vec<f64> = (0..5).map(|_| b.sample()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_clones_share_state() {
        let a = Jitter::seeded(1);
        let b = a.clone();
        let fresh = Jitter::seeded(1);
        let _ = a.sample();
        let _ = fresh.sample();
        assert_eq!(b.sample(), fresh.sample());
    }

    #[test]
    fn test_fixed_is_clamped() {
        assert_eq!(Jitter::Fixed(0.25).sample(), 0.25);
        assert_eq!(Jitter::Fixed(-3.0).sample(), 0.0);
        assert!(Jitter::Fixed(7.0).sample() < 1.0);
        assert_eq!(Jitter::Fixed(f64::NAN).sample(), 0.5);
    }

    #[test]
    fn test_debug_hides_rng_state() {
        assert_eq!(format!("{:?}", Jitter::seeded(3)), "Seeded(..)");
        assert_eq!(format!("{:?}", Jitter::Fixed(0.1)), "Fixed(0.1)");
    }
}
