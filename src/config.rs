//! Optimizer configuration: `Config`/`ConfigBuilder`, validating spec.md
//! §6's recognized options eagerly rather than substituting silent defaults.

use crate::error::SrcpspError;
use std::time::Duration;

/// Fitness aggregation over a Monte Carlo replication batch (spec.md §4.G).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aggregate {
    /// Arithmetic mean of replication makespans.
    Mean,
    /// `q`-quantile of replication makespans, `q` in `(0, 1)`.
    Quantile(f64),
}

impl Default for Aggregate {
    fn default() -> Self {
        Aggregate::Mean
    }
}

/// Recognized optimizer options (spec.md §6's table, plus `aggregate` and
/// `arc_rounds` which the GA design requires to be configurable rather than
/// hardcoded — see SPEC_FULL.md §6).
#[derive(Debug, Clone)]
pub struct Config {
    pub policy: String,
    pub list_pop: u32,
    pub arc_pop: u32,
    pub list_gens: u32,
    pub arc_gens: u32,
    pub mc_replications: u32,
    pub stochastic: bool,
    pub seed: u64,
    pub time_budget: Option<Duration>,
    pub aggregate: Aggregate,
    pub arc_rounds: u32,
    pub tournament_size: u32,
    pub mutation_rate: f64,
    pub stall_generations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: "reference".to_string(),
            list_pop: 50,
            arc_pop: 50,
            list_gens: 100,
            arc_gens: 100,
            mc_replications: 30,
            stochastic: true,
            seed: 0,
            time_budget: None,
            aggregate: Aggregate::Mean,
            arc_rounds: 1,
            tournament_size: 3,
            mutation_rate: 0.05,
            stall_generations: 10,
        }
    }
}

/// Builder validating every option eagerly; returns `ConfigError` rather
/// than clamping or defaulting a nonsensical value.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    pub fn policy(mut self, name: impl Into<String>) -> Self {
        self.config.policy = name.into();
        self
    }

    pub fn list_pop(mut self, value: u32) -> Self {
        self.config.list_pop = value;
        self
    }

    pub fn arc_pop(mut self, value: u32) -> Self {
        self.config.arc_pop = value;
        self
    }

    pub fn list_gens(mut self, value: u32) -> Self {
        self.config.list_gens = value;
        self
    }

    pub fn arc_gens(mut self, value: u32) -> Self {
        self.config.arc_gens = value;
        self
    }

    pub fn mc_replications(mut self, value: u32) -> Self {
        self.config.mc_replications = value;
        self
    }

    pub fn stochastic(mut self, value: bool) -> Self {
        self.config.stochastic = value;
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.config.seed = value;
        self
    }

    pub fn time_budget(mut self, value: Duration) -> Self {
        self.config.time_budget = Some(value);
        self
    }

    pub fn aggregate(mut self, value: Aggregate) -> Self {
        self.config.aggregate = value;
        self
    }

    pub fn arc_rounds(mut self, value: u32) -> Self {
        self.config.arc_rounds = value;
        self
    }

    pub fn tournament_size(mut self, value: u32) -> Self {
        self.config.tournament_size = value;
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.config.mutation_rate = value;
        self
    }

    pub fn stall_generations(mut self, value: u32) -> Self {
        self.config.stall_generations = value;
        self
    }

    /// Validates every option and returns the finished `Config`, or a
    /// `ConfigError` naming the first offending option.
    pub fn build(self) -> Result<Config, SrcpspError> {
        let c = &self.config;

        if crate::policy::build(&c.policy, 0).is_err() {
            return Err(SrcpspError::ConfigError(format!("unknown policy {:?}", c.policy)));
        }
        if c.list_pop == 0 {
            return Err(SrcpspError::ConfigError("list_pop must be > 0".into()));
        }
        if c.arc_pop == 0 {
            return Err(SrcpspError::ConfigError("arc_pop must be > 0".into()));
        }
        if c.list_gens == 0 {
            return Err(SrcpspError::ConfigError("list_gens must be > 0".into()));
        }
        if c.arc_gens == 0 {
            return Err(SrcpspError::ConfigError("arc_gens must be > 0".into()));
        }
        if c.mc_replications == 0 {
            return Err(SrcpspError::ConfigError("mc_replications must be > 0".into()));
        }
        if c.tournament_size == 0 {
            return Err(SrcpspError::ConfigError("tournament_size must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&c.mutation_rate) {
            return Err(SrcpspError::ConfigError("mutation_rate must be in [0, 1]".into()));
        }
        if let Aggregate::Quantile(q) = c.aggregate {
            if !(q > 0.0 && q < 1.0) {
                return Err(SrcpspError::ConfigError("quantile must be in (0, 1)".into()));
            }
        }
        if c.arc_rounds == 0 {
            return Err(SrcpspError::ConfigError("arc_rounds must be > 0".into()));
        }

        Ok(self.config)
    }
}
