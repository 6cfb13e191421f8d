//! Monte Carlo fitness harness (spec.md §4.G): runs `M` independent
//! simulations per individual and aggregates to a scalar fitness, seeded
//! deterministically from individual identity plus a run counter.

use crate::broker::BrokerStrategy;
use crate::config::Aggregate;
use crate::domain::{ArcSet, Job};
use crate::error::SrcpspError;
use crate::ids::TaskId;
use crate::policy;
use crate::simulator::Simulator;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Fraction of replications allowed to deadlock before an individual is
/// flagged invalid with infinite fitness (spec.md §4.G).
const MAX_INVALID_FRACTION: f64 = 0.1;

/// Deterministic splitmix64-style mixer: folds `(base_seed, generation,
/// individual, replication)` into one `u64` RNG seed, with no wall-clock
/// entropy, so a fitness evaluation is byte-for-byte reproducible.
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn mix_seed(base_seed: u64, generation: u32, individual: u32, replication: u32) -> u64 {
    let mut h = splitmix64(base_seed);
    h = splitmix64(h ^ generation as u64);
    h = splitmix64(h ^ individual as u64);
    splitmix64(h ^ replication as u64)
}

/// Outcome of one individual's Monte Carlo fitness evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessOutcome {
    pub fitness: f64,
    /// True when more than 10% of replications deadlocked (spec.md §4.G):
    /// `fitness` is `f64::INFINITY` and this individual should be reported
    /// as `InvalidIndividual`, though it is not excluded from selection by
    /// a separate code path — infinite fitness already loses every
    /// tournament.
    pub invalid: bool,
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = pos - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Runs `replications` independent simulations of `(policy_name, list,
/// arcs)` and aggregates their makespans. A replication whose simulator run
/// deadlocks is discarded, not propagated as an `Err` — only a config/policy
/// lookup failure is.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    job: &Job,
    policy_name: &str,
    list: &[TaskId],
    arcs: &ArcSet,
    strategy: &dyn BrokerStrategy,
    replications: u32,
    aggregate: Aggregate,
    stochastic: bool,
    base_seed: u64,
    generation: u32,
    individual: u32,
) -> Result<FitnessOutcome, SrcpspError> {
    let mut makespans = Vec::with_capacity(replications as usize);
    let mut invalid_count = 0u32;

    for replication in 0..replications {
        let seed = mix_seed(base_seed, generation, individual, replication);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut dispatcher = policy::build(policy_name, seed)?;
        match Simulator::run(job, list, arcs, dispatcher.as_mut(), strategy, &mut rng, stochastic)
        {
            Ok(result) => makespans.push(result.total_time),
            Err(SrcpspError::DeadlockError { .. }) => invalid_count += 1,
            Err(other) => return Err(other),
        }
    }

    if replications > 0 && invalid_count as f64 / replications as f64 > MAX_INVALID_FRACTION {
        return Ok(FitnessOutcome { fitness: f64::INFINITY, invalid: true });
    }
    if makespans.is_empty() {
        return Ok(FitnessOutcome { fitness: f64::INFINITY, invalid: true });
    }

    let fitness = match aggregate {
        Aggregate::Mean => makespans.iter().sum::<f64>() / makespans.len() as f64,
        Aggregate::Quantile(q) => {
            let mut sorted = makespans.clone();
            sorted.sort_by(f64::total_cmp);
            quantile(&sorted, q)
        }
    };
    Ok(FitnessOutcome { fitness, invalid: false })
}
