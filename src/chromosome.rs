//! Chromosome representation: one complete candidate solution.

use crate::problem::Problem;
use crate::route_builder::RouteBuilder;
use crate::solution::{Depot, RouteState};
use itertools::Itertools;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;

/// How strongly vehicle-count violations are punished as generations pass.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyPolicy {
    /// Penalty per depot over the vehicle limit at generation 0
    pub weight: f64,
    /// Generation scale `K` of the ramp `(generation + K) / K`
    pub time_constant: f64,
}

impl PenaltyPolicy {
    pub fn new(weight: f64, time_constant: f64) -> Self {
        PenaltyPolicy {
            weight,
            time_constant,
        }
    }

    /// Grows linearly with the generation, 1.0 at generation 0.
    pub fn time_factor(&self, generation: usize) -> f64 {
        (generation as f64 + self.time_constant) / self.time_constant
    }

    /// Penalty for `violations` over-full depots at `generation`.
    pub fn penalty(&self, violations: usize, generation: usize) -> f64 {
        self.weight * violations as f64 * self.time_factor(generation)
    }
}

/// A candidate solution: every depot with its own routes.
#[derive(Debug, Clone)]
pub struct Chromosome {
    pub depots: Vec<Depot>,
    /// Total distance plus the vehicle-count penalty; lower is better
    pub fitness: f64,
    /// Number of depots using more vehicles than allowed
    pub too_many_routes: usize,
}

impl Chromosome {
    /// Create a chromosome from per-depot state. Fitness is unknown until evaluated.
    pub fn new(depots: Vec<Depot>) -> Self {
        Chromosome {
            depots,
            fitness: f64::INFINITY,
            too_many_routes: 0,
        }
    }

    /// Construct routes for every depot whose customer order is pending.
    pub fn build_routes(&mut self, problem: &Problem) {
        for depot in self
            .depots
            .iter_mut()
            .filter(|depot| depot.state == RouteState::NeedsRebuild)
        {
            RouteBuilder::build(depot, problem);
        }
    }

    /// Sum of all route lengths.
    pub fn total_distance(&self) -> f64 {
        self.depots.iter().map(Depot::total_length).sum()
    }

    /// Count depots whose route count exceeds the vehicle limit.
    pub fn recompute_legality(&mut self, max_vehicles_per_depot: usize) {
        self.too_many_routes = self
            .depots
            .iter()
            .filter(|depot| depot.routes.len() > max_vehicles_per_depot)
            .count();
    }

    /// Total distance plus the generation-scaled vehicle penalty.
    pub fn recompute_fitness(&mut self, generation: usize, penalty: &PenaltyPolicy) {
        self.fitness =
            self.total_distance() + penalty.penalty(self.too_many_routes, generation);
    }

    /// Refresh legality and fitness.
    pub fn evaluate(&mut self, problem: &Problem, generation: usize, penalty: &PenaltyPolicy) {
        self.recompute_legality(problem.max_vehicles_per_depot);
        self.recompute_fitness(generation, penalty);
    }

    /// Check if no depot exceeds the vehicle limit.
    pub fn is_legal(&self) -> bool {
        self.too_many_routes == 0
    }

    /// Locate a customer as `(depot, route, position)`.
    pub fn find(&self, customer: usize) -> Option<(usize, usize, usize)> {
        self.depots
            .iter()
            .enumerate()
            .find_map(|(d, depot)| depot.find(customer).map(|(r, pos)| (d, r, pos)))
    }

    /// Remove a customer from whichever depot serves it. Returns that depot.
    pub fn remove_customer(&mut self, customer: usize, problem: &Problem) -> Option<usize> {
        self.depots
            .iter_mut()
            .position(|depot| depot.remove_customer(customer, problem))
    }

    /// Check that every customer `0..customer_count` is routed exactly once.
    pub fn conserves_customers(&self, customer_count: usize) -> bool {
        let counts = self
            .depots
            .iter()
            .flat_map(|depot| depot.routed_customers())
            .counts();

        counts.len() == customer_count
            && counts
                .iter()
                .all(|(&customer, &seen)| customer < customer_count && seen == 1)
    }

    /// Order by fitness, treating incomparable values as equal.
    pub fn cmp_fitness(&self, other: &Chromosome) -> Ordering {
        self.fitness
            .partial_cmp(&other.fitness)
            .unwrap_or(Ordering::Equal)
    }

    /// Shuffle each depot's customer order and rebuild its routes.
    pub fn randomize<R: Rng + ?Sized>(&mut self, problem: &Problem, rng: &mut R) {
        for depot in &mut self.depots {
            depot.shuffle_customers(rng);
        }
        self.build_routes(problem);
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chromosome:")?;
        writeln!(f, "  Fitness: {:.2}", self.fitness)?;
        writeln!(f, "  Distance: {:.2}", self.total_distance())?;
        writeln!(f, "  Over-full depots: {}", self.too_many_routes)?;
        for depot in &self.depots {
            write!(f, "{}", depot)?;
        }
        Ok(())
    }
}
