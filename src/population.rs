//! Population management for the genetic algorithm.

use crate::chromosome::{Chromosome, PenaltyPolicy};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::problem::Problem;
use crate::solution::assign_customers;
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

/// One generation of chromosomes.
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub chromosomes: Vec<Chromosome>,
}

impl Population {
    /// Wrap an existing set of chromosomes.
    pub fn new(chromosomes: Vec<Chromosome>) -> Self {
        Population { chromosomes }
    }

    /// Build the initial population: assign customers to their nearest depot,
    /// then give every chromosome its own shuffled customer order and routes.
    pub fn initialize<R: Rng + ?Sized>(
        problem: &Problem,
        config: &Config,
        penalty: &PenaltyPolicy,
        rng: &mut R,
    ) -> Self {
        let template = assign_customers(problem, config.bound);

        let chromosomes = (0..config.population_size)
            .map(|_| {
                let mut chromosome = Chromosome::new(template.clone());
                chromosome.randomize(problem, rng);
                chromosome.evaluate(problem, 0, penalty);
                chromosome
            })
            .collect();

        Population { chromosomes }
    }

    /// Get the population size.
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    /// Check if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn as_slice(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Chromosomes ordered by ascending fitness.
    pub fn sorted_by_fitness(&self) -> Vec<&Chromosome> {
        self.chromosomes
            .iter()
            .sorted_by(|a, b| a.cmp_fitness(b))
            .collect()
    }

    /// The fittest chromosome within the vehicle limit.
    pub fn best_legal(&self) -> Option<&Chromosome> {
        self.chromosomes
            .iter()
            .filter(|c| c.is_legal())
            .min_by(|a, b| a.cmp_fitness(b))
    }

    /// Like `best_legal`, reporting the absence of a legal chromosome as an error.
    pub fn require_best_legal(&self) -> Result<&Chromosome> {
        self.best_legal().ok_or(Error::NoLegalSolution {
            population_size: self.len(),
        })
    }

    /// Fitness of the best legal chromosome.
    pub fn best_legal_fitness(&self) -> Option<f64> {
        self.best_legal().map(|c| c.fitness)
    }

    /// Mean fitness over the whole population.
    pub fn mean_fitness(&self) -> f64 {
        if self.chromosomes.is_empty() {
            return 0.0;
        }
        self.chromosomes.iter().map(|c| c.fitness).sum::<f64>() / self.len() as f64
    }

    /// Number of chromosomes within the vehicle limit.
    pub fn legal_count(&self) -> usize {
        self.chromosomes.iter().filter(|c| c.is_legal()).count()
    }

    /// Form the next generation: shuffle the offspring, then overwrite the
    /// first `elite_count` of them with the best chromosomes of `self`.
    pub fn next_generation<R: Rng + ?Sized>(
        &self,
        mut offspring: Vec<Chromosome>,
        elite_count: usize,
        rng: &mut R,
    ) -> Population {
        offspring.shuffle(rng);

        for (slot, elite) in offspring
            .iter_mut()
            .zip(self.sorted_by_fitness())
            .take(elite_count)
        {
            *slot = elite.clone();
        }

        Population::new(offspring)
    }
}
