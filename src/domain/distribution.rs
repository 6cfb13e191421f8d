//! Task duration distributions.
//!
//! A tagged variant over duration families, each exposing a single
//! `sample(&mut Rng) -> f64` operation. `PhaseType` is represented, per the
//! design decision recorded in SPEC_FULL.md, as an opaque positive-support
//! family fitted offline and serialized as `Empirical` samples — this crate
//! never attempts to infer phase-type parameters itself.

use rand::Rng;
use rand_distr::{Distribution as _, Normal as NormalDist};

/// Maximum number of resample attempts before a truncated-normal draw falls
/// back to zero. Guards against pathological (mean, std_dev) pairs that would
/// otherwise retry indefinitely.
const NORMAL_RESAMPLE_LIMIT: u32 = 64;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    /// Deterministic duration equal to `mean`.
    Fixed(f64),
    /// Normal distribution truncated at 0 (resampled on negative draws).
    Normal { mean: f64, std_dev: f64 },
    /// Opaque positive-support family fit offline; stored as samples.
    PhaseType(Vec<f64>),
    /// Precomputed empirical sample buffer, drawn from uniformly at random.
    Empirical(Vec<f64>),
}

impl Distribution {
    /// The distribution's mean, used as the FIXED-distribution value and as
    /// a fallback when a sample buffer is empty.
    pub fn mean(&self) -> f64 {
        match self {
            Distribution::Fixed(mean) => *mean,
            Distribution::Normal { mean, .. } => *mean,
            Distribution::PhaseType(samples) | Distribution::Empirical(samples) => {
                if samples.is_empty() {
                    0.0
                } else {
                    samples.iter().sum::<f64>() / samples.len() as f64
                }
            }
        }
    }

    /// Draws a single duration sample.
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self {
            Distribution::Fixed(mean) => *mean,
            Distribution::Normal { mean, std_dev } => {
                if *std_dev <= 0.0 {
                    return mean.max(0.0);
                }
                let normal = NormalDist::new(*mean, *std_dev)
                    .expect("std_dev > 0.0 checked above, Normal::new cannot fail");
                for _ in 0..NORMAL_RESAMPLE_LIMIT {
                    let draw = normal.sample(rng);
                    if draw >= 0.0 {
                        return draw;
                    }
                }
                0.0
            }
            Distribution::PhaseType(samples) | Distribution::Empirical(samples) => {
                if samples.is_empty() {
                    0.0
                } else {
                    let idx = rng.gen_range(0..samples.len());
                    samples[idx]
                }
            }
        }
    }
}
