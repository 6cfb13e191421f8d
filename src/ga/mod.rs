//! Two-layer genetic-algorithm optimizer: `ListGA` over priority-list
//! permutations (§4.E) and `ArcGA` over additional-arcs bit-vectors (§4.F),
//! both driven by the Monte Carlo fitness harness (§4.G).
//!
//! Grounded on the `GaProblem`-style trait shape in
//! `examples/other_examples/b6659d30_iyulab-u-schedule__src-ga-problem.rs`
//! (generic-`Rng` operator functions, not a fixed RNG type) and on
//! `original_source/deepThought/simulator/simulator.py`'s
//! `getListGALog`/`getArcGALog` for the `{min, max, mean}` per-generation
//! log shape.

pub mod arcga;
pub mod harness;
pub mod listga;

/// One generation's fitness summary, reported to the optimizer's caller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Individuals this generation whose fitness was `f64::INFINITY`
    /// because more than 10% of their Monte Carlo replications deadlocked
    /// (spec.md §4.G / §7's `InvalidIndividual`).
    pub invalid_count: u32,
}

impl GenerationStats {
    pub fn from_fitnesses(fitnesses: &[f64], invalid_count: u32) -> Self {
        let finite: Vec<f64> = fitnesses.iter().copied().filter(|f| f.is_finite()).collect();
        if finite.is_empty() {
            return Self { min: f64::INFINITY, max: f64::INFINITY, mean: f64::INFINITY, invalid_count };
        }
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        Self { min, max, mean, invalid_count }
    }
}

pub use arcga::{ArcGaResult, ArcIndividual};
pub use harness::mix_seed;
pub use listga::ListGaResult;
