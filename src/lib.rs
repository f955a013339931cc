//! # MDVRP-GA
//!
//! A genetic algorithm for the Multi-Depot Vehicle Routing Problem (MDVRP).
//!
//! Customers start at their nearest depot. Each chromosome orders every
//! depot's customers, packs them greedily into capacity and duration limited
//! routes and then evolves through route-exchange crossover, intra-depot
//! mutations and periodic inter-depot relocation of borderline customers.
//! Depots that need more vehicles than allowed are penalized, with the penalty
//! growing over the generations.
//!
//! Offspring are bred in parallel on a worker pool that lives as long as the
//! solver; elitism carries the best chromosomes of each generation forward.

pub mod chromosome;
pub mod config;
pub mod error;
pub mod genetic;
pub mod insertion;
pub mod population;
pub mod problem;
pub mod route_builder;
pub mod solution;
pub mod utils;

use crate::chromosome::{Chromosome, PenaltyPolicy};
use crate::config::{Config, ConfigWarning};
use crate::error::{Error, Result};
use crate::genetic::Genetic;
use crate::population::Population;
use crate::problem::Problem;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Lifecycle of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Initializing,
    Evolving,
    /// The best legal fitness reached the stop threshold at this generation.
    EarlyStopped { generation: usize },
    MaxGenerationReached,
}

/// The main algorithm structure that drives the generations.
pub struct MdvrpGa {
    pub problem: Problem,
    pub config: Config,
    pub population: Population,
    pub penalty: PenaltyPolicy,
    pub state: SolverState,
    pub generation: usize,
    /// Corrections applied to the configuration
    pub warnings: Vec<ConfigWarning>,
    pub run_time: Duration,
    rng: ChaCha8Rng,
    pool: ThreadPool,
}

impl MdvrpGa {
    /// Create a solver. The configuration is normalized first; an odd
    /// population size is reduced by one and reported in `warnings`.
    pub fn new(problem: Problem, mut config: Config) -> Result<Self> {
        let warnings = config.normalize()?;

        if problem.depots.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "instance '{}' has no depots",
                problem.name
            )));
        }

        let threads = config.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mdvrp-worker-{}", i))
            .build()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(MdvrpGa {
            penalty: PenaltyPolicy::new(config.penalty_weight, config.penalty_time_constant),
            problem,
            config,
            population: Population::default(),
            state: SolverState::Initializing,
            generation: 0,
            warnings,
            run_time: Duration::from_secs(0),
            rng,
            pool,
        })
    }

    /// Fill the population with shuffled, routed and evaluated chromosomes.
    pub fn initialize(&mut self) {
        info!(
            "Initializing {} chromosomes for '{}' ({} customers, {} depots, {} workers)",
            self.config.population_size,
            self.problem.name,
            self.problem.get_customer_count(),
            self.problem.get_depot_count(),
            self.pool.current_num_threads()
        );

        self.population =
            Population::initialize(&self.problem, &self.config, &self.penalty, &mut self.rng);
        self.generation = 0;
        self.state = SolverState::Evolving;
    }

    /// Evolve until the stop threshold or the generation limit is reached and
    /// return the best legal chromosome of the final population.
    pub fn run(&mut self) -> Result<&Chromosome> {
        let start_time = Instant::now();
        self.initialize();

        while self.generation < self.config.max_generation {
            self.generation += 1;
            self.evolve_generation();

            if self.generation % self.config.report_interval == 0 && self.checkpoint() {
                self.state = SolverState::EarlyStopped {
                    generation: self.generation,
                };
                break;
            }
        }

        if self.state == SolverState::Evolving {
            self.state = SolverState::MaxGenerationReached;
        }
        self.run_time = start_time.elapsed();

        info!(
            "Finished after {} generations ({:?}) in {}",
            self.generation,
            self.state,
            utils::format_duration(self.run_time)
        );

        self.population.require_best_legal()
    }

    /// Log progress and tell whether the stop threshold has been reached.
    pub fn checkpoint(&self) -> bool {
        let best = self.population.best_legal_fitness();
        let mean = self.population.mean_fitness();

        match best {
            Some(best) => info!(
                "Generation {}: best legal fitness {:.2}, mean fitness {:.2}, {} legal",
                self.generation,
                best,
                mean,
                self.population.legal_count()
            ),
            None => info!(
                "Generation {}: no legal chromosome yet, mean fitness {:.2}",
                self.generation, mean
            ),
        }

        match (best, self.config.stop_threshold) {
            (Some(best), Some(threshold)) => best <= threshold,
            _ => false,
        }
    }

    /// Replace the population with the next generation.
    pub fn evolve_generation(&mut self) {
        let offspring = self.breed(self.generation);
        let elite_count = self.config.elitism_count();
        self.population = self
            .population
            .next_generation(offspring, elite_count, &mut self.rng);

        debug!(
            "Generation {}: mean fitness {:.2}",
            self.generation,
            self.population.mean_fitness()
        );
    }

    /// Produce `population_size` offspring on the worker pool.
    ///
    /// Workers claim one parent pair at a time from a shared counter; parents
    /// are only read, offspring are collected in a shared vector.
    fn breed(&mut self, generation: usize) -> Vec<Chromosome> {
        let size = self.config.population_size;
        let remaining = AtomicUsize::new(size / 2);
        let results = Mutex::new(Vec::with_capacity(size));

        let seeds: Vec<u64> = (0..self.pool.current_num_threads())
            .map(|_| self.rng.gen())
            .collect();

        let genetic = Genetic::new(&self.problem, &self.config);
        let parents = self.population.as_slice();
        let problem = &self.problem;
        let penalty = &self.penalty;

        self.pool.scope(|scope| {
            for seed in seeds {
                let remaining = &remaining;
                let results = &results;
                let genetic = &genetic;

                scope.spawn(move |_| {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);

                    while claim(remaining) {
                        let (parent1, parent2) = genetic.select_parents(parents, &mut rng);
                        let (mut offspring1, mut offspring2) =
                            genetic.crossover(parent1, parent2, &mut rng);

                        for offspring in [&mut offspring1, &mut offspring2] {
                            genetic.mutate(offspring, generation, &mut rng);
                            offspring.evaluate(problem, generation, penalty);
                            debug_assert!(
                                offspring.conserves_customers(problem.get_customer_count()),
                                "an operator lost or duplicated a customer"
                            );
                        }

                        results
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend([offspring1, offspring2]);
                    }
                });
            }
        });

        let mut offspring = results
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        offspring.truncate(size);
        offspring
    }
}

/// Take one unit of work, false once the counter is exhausted.
fn claim(remaining: &AtomicUsize) -> bool {
    remaining
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        .is_ok()
}
