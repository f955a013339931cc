//! Configuration parameters for the MDVRP genetic algorithm.

use crate::error::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration settings for the genetic algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of chromosomes per generation (must be even)
    pub population_size: usize,
    /// Number of generations to evolve at most
    pub max_generation: usize,
    /// Share of the previous generation carried over unchanged
    pub elite_ratio: f64,
    /// Probability that a parent pair exchanges routes
    pub crossover_chance: f64,
    /// Probability that an offspring receives an intra-depot mutation
    pub mutation_chance: f64,
    /// Relative distance bound used to mark customers as swappable between depots
    pub bound: f64,
    /// Probability that a tournament returns the fitter of the two contestants
    pub tournament_selection_number: f64,
    /// Probability that crossover reinserts at the best location instead of the first feasible one
    pub crossover_insertion_number: f64,
    /// Inter-depot mutation replaces intra-depot mutation every `apprate` generations (0 disables it)
    #[serde(alias = "APPRATE")]
    pub apprate: usize,
    /// Stop as soon as the best legal fitness drops to this value
    pub stop_threshold: Option<f64>,
    /// Penalty per depot exceeding the vehicle limit
    pub penalty_weight: f64,
    /// Generation scale of the penalty ramp `(generation + K) / K`
    pub penalty_time_constant: f64,
    /// Generations between progress checkpoints
    pub report_interval: usize,
    /// Worker threads; `None` uses the available parallelism
    pub worker_threads: Option<usize>,
    /// Seed for the master random generator
    pub seed: Option<u64>,
    /// Instance to solve when none is given on the command line
    pub input_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 100,
            max_generation: 3000,
            elite_ratio: 0.01,
            crossover_chance: 0.6,
            mutation_chance: 0.2,
            bound: 2.0,
            tournament_selection_number: 0.8,
            crossover_insertion_number: 0.8,
            apprate: 10,
            stop_threshold: None,
            penalty_weight: 100.0,
            penalty_time_constant: 100.0,
            report_interval: 100,
            worker_threads: None,
            seed: None,
            input_file: None,
        }
    }
}

/// A configuration value that was corrected rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    OddPopulationSize { requested: usize, adjusted: usize },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::OddPopulationSize {
                requested,
                adjusted,
            } => write!(
                f,
                "population size {} is odd, using {} instead",
                requested, adjusted
            ),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Load a configuration file. `.yaml` and `.yml` files are read as YAML,
    /// everything else as JSON. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml");
        let config = if is_yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(config)
    }

    /// Fix what can be fixed and reject what cannot.
    pub fn normalize(&mut self) -> Result<Vec<ConfigWarning>> {
        let mut warnings = Vec::new();

        if self.population_size % 2 == 1 {
            let warning = ConfigWarning::OddPopulationSize {
                requested: self.population_size,
                adjusted: self.population_size - 1,
            };
            warn!("{}", warning);
            self.population_size -= 1;
            warnings.push(warning);
        }

        if self.population_size < 2 {
            return Err(Error::InvalidConfig(format!(
                "population size must be at least 2, got {}",
                self.population_size
            )));
        }

        let probabilities = [
            ("elite_ratio", self.elite_ratio),
            ("crossover_chance", self.crossover_chance),
            ("mutation_chance", self.mutation_chance),
            ("tournament_selection_number", self.tournament_selection_number),
            ("crossover_insertion_number", self.crossover_insertion_number),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.bound < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bound must not be negative, got {}",
                self.bound
            )));
        }
        if self.penalty_time_constant <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "penalty_time_constant must be positive, got {}",
                self.penalty_time_constant
            )));
        }
        if self.report_interval == 0 {
            return Err(Error::InvalidConfig(
                "report_interval must be at least 1".to_string(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(Error::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }

        Ok(warnings)
    }

    /// Number of elite chromosomes carried into each new generation.
    pub fn elitism_count(&self) -> usize {
        ((self.population_size as f64 * self.elite_ratio).round() as usize)
            .min(self.population_size)
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the maximum number of generations.
    pub fn with_max_generation(mut self, generations: usize) -> Self {
        self.max_generation = generations;
        self
    }

    /// Set the elite ratio.
    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Set the crossover probability.
    pub fn with_crossover_chance(mut self, chance: f64) -> Self {
        self.crossover_chance = chance;
        self
    }

    /// Set the intra-depot mutation probability.
    pub fn with_mutation_chance(mut self, chance: f64) -> Self {
        self.mutation_chance = chance;
        self
    }

    /// Set the swappable-customer bound.
    pub fn with_bound(mut self, bound: f64) -> Self {
        self.bound = bound;
        self
    }

    /// Set the tournament selection probability.
    pub fn with_tournament_selection_number(mut self, p: f64) -> Self {
        self.tournament_selection_number = p;
        self
    }

    /// Set the probability of best insertion during crossover.
    pub fn with_crossover_insertion_number(mut self, p: f64) -> Self {
        self.crossover_insertion_number = p;
        self
    }

    /// Set the inter-depot mutation interval.
    pub fn with_apprate(mut self, apprate: usize) -> Self {
        self.apprate = apprate;
        self
    }

    /// Set the early stop threshold.
    pub fn with_stop_threshold(mut self, threshold: f64) -> Self {
        self.stop_threshold = Some(threshold);
        self
    }

    /// Set the penalty weight and its generation time constant.
    pub fn with_penalty(mut self, weight: f64, time_constant: f64) -> Self {
        self.penalty_weight = weight;
        self.penalty_time_constant = time_constant;
        self
    }

    /// Set the checkpoint interval.
    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = interval;
        self
    }

    /// Set the number of worker threads.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the instance file used when none is given on the command line.
    pub fn with_input_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_file = Some(path.into());
        self
    }
}
