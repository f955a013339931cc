//! Genetic operators for the MDVRP: selection, crossover and mutation.

use crate::chromosome::Chromosome;
use crate::config::Config;
use crate::insertion::{insert_at_best_location, insert_at_first_feasible_location};
use crate::problem::Problem;
use crate::solution::Depot;
use crate::utils::{random_subrange, two_distinct};
use rand::seq::SliceRandom;
use rand::Rng;

/// The intra-depot mutations, chosen uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntraDepotMutation {
    Reversal,
    Rerouting,
    Swapping,
}

impl IntraDepotMutation {
    pub const ALL: [IntraDepotMutation; 3] = [
        IntraDepotMutation::Reversal,
        IntraDepotMutation::Rerouting,
        IntraDepotMutation::Swapping,
    ];
}

/// Implements the genetic operators over a fixed problem and configuration.
///
/// Operators never touch their parents: crossover clones them and mutations
/// work on owned offspring.
pub struct Genetic<'a> {
    problem: &'a Problem,
    config: &'a Config,
}

impl<'a> Genetic<'a> {
    pub fn new(problem: &'a Problem, config: &'a Config) -> Self {
        Genetic { problem, config }
    }

    /// Run `winners` binary tournaments. Each samples two chromosomes uniformly;
    /// with probability `tournament_selection_number` the fitter one wins,
    /// otherwise a random one of the two.
    ///
    /// `population` must not be empty.
    pub fn tournament_selection<'p, R: Rng + ?Sized>(
        &self,
        population: &'p [Chromosome],
        winners: usize,
        rng: &mut R,
    ) -> Vec<&'p Chromosome> {
        (0..winners)
            .map(|_| {
                let first = &population[rng.gen_range(0..population.len())];
                let second = &population[rng.gen_range(0..population.len())];

                if rng.gen_bool(self.config.tournament_selection_number) {
                    if first.fitness <= second.fitness {
                        first
                    } else {
                        second
                    }
                } else if rng.gen_bool(0.5) {
                    first
                } else {
                    second
                }
            })
            .collect()
    }

    /// Select two parents by tournament.
    pub fn select_parents<'p, R: Rng + ?Sized>(
        &self,
        population: &'p [Chromosome],
        rng: &mut R,
    ) -> (&'p Chromosome, &'p Chromosome) {
        let winners = self.tournament_selection(population, 2, rng);
        (winners[0], winners[1])
    }

    /// Route-exchange crossover with best-insertion repair.
    ///
    /// One random route is taken from a random depot of each parent. The
    /// customers of one parent's route are removed from the other offspring and
    /// reinserted into that offspring's chosen depot, and vice versa.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        let mut offspring1 = parent1.clone();
        let mut offspring2 = parent2.clone();

        if offspring1.depots.is_empty()
            || offspring2.depots.is_empty()
            || !rng.gen_bool(self.config.crossover_chance)
        {
            return (offspring1, offspring2);
        }

        let depot1 = rng.gen_range(0..offspring1.depots.len());
        let depot2 = rng.gen_range(0..offspring2.depots.len());
        let route1 = random_route_customers(&offspring1.depots[depot1], rng);
        let route2 = random_route_customers(&offspring2.depots[depot2], rng);

        for &customer in &route1 {
            offspring2.remove_customer(customer, self.problem);
        }
        for &customer in &route2 {
            offspring1.remove_customer(customer, self.problem);
        }

        self.reinsert(&mut offspring2.depots[depot2], &route1, rng);
        self.reinsert(&mut offspring1.depots[depot1], &route2, rng);

        (offspring1, offspring2)
    }

    fn reinsert<R: Rng + ?Sized>(&self, depot: &mut Depot, customers: &[usize], rng: &mut R) {
        for &customer in customers {
            if rng.gen_bool(self.config.crossover_insertion_number) {
                insert_at_best_location(depot, customer, self.problem);
            } else {
                insert_at_first_feasible_location(depot, customer, self.problem);
            }
        }
    }

    /// Mutate an offspring. Every `apprate`-th generation it is an inter-depot
    /// relocation, otherwise an intra-depot mutation with probability
    /// `mutation_chance`.
    pub fn mutate<R: Rng + ?Sized>(&self, offspring: &mut Chromosome, generation: usize, rng: &mut R) {
        if self.is_inter_depot_generation(generation) {
            self.inter_depot_mutation(offspring, rng);
        } else if rng.gen_bool(self.config.mutation_chance) {
            self.intra_depot_mutation(offspring, rng);
        }
    }

    /// Check if `generation` uses inter-depot mutation.
    pub fn is_inter_depot_generation(&self, generation: usize) -> bool {
        self.config.apprate > 0 && generation % self.config.apprate == 0
    }

    /// Apply one uniformly chosen intra-depot mutation to a random depot.
    pub fn intra_depot_mutation<R: Rng + ?Sized>(&self, offspring: &mut Chromosome, rng: &mut R) {
        let kind = IntraDepotMutation::ALL[rng.gen_range(0..IntraDepotMutation::ALL.len())];
        if let Some(depot) = offspring.depots.choose_mut(rng) {
            self.apply_intra_depot(kind, depot, rng);
        }
    }

    /// Apply a specific intra-depot mutation to one depot.
    pub fn apply_intra_depot<R: Rng + ?Sized>(
        &self,
        kind: IntraDepotMutation,
        depot: &mut Depot,
        rng: &mut R,
    ) {
        match kind {
            IntraDepotMutation::Reversal => self.reversal(depot, rng),
            IntraDepotMutation::Rerouting => self.rerouting(depot, rng),
            IntraDepotMutation::Swapping => self.swapping(depot, rng),
        }
    }

    /// Reverse a random contiguous segment of a random route.
    pub fn reversal<R: Rng + ?Sized>(&self, depot: &mut Depot, rng: &mut R) {
        if depot.routes.is_empty() {
            return;
        }
        let r = rng.gen_range(0..depot.routes.len());
        let len = depot.routes[r].len();
        if len < 2 {
            return;
        }

        let (start, end) = random_subrange(len, rng);
        depot.routes[r].customers[start..=end].reverse();
        depot.recompute_route(r, self.problem);
    }

    /// Take one random customer out of its route and reinsert it at the best
    /// location of the same depot.
    pub fn rerouting<R: Rng + ?Sized>(&self, depot: &mut Depot, rng: &mut R) {
        if depot.routes.is_empty() {
            return;
        }
        let r = rng.gen_range(0..depot.routes.len());
        let pos = rng.gen_range(0..depot.routes[r].len());

        let customer = depot.routes[r].customers.remove(pos);
        if depot.routes[r].is_empty() {
            depot.routes.remove(r);
        } else {
            depot.recompute_route(r, self.problem);
        }

        insert_at_best_location(depot, customer, self.problem);
    }

    /// Exchange one random customer between two distinct random routes.
    pub fn swapping<R: Rng + ?Sized>(&self, depot: &mut Depot, rng: &mut R) {
        let (r1, r2) = match two_distinct(depot.routes.len(), rng) {
            Some(pair) => pair,
            None => return,
        };
        let p1 = rng.gen_range(0..depot.routes[r1].len());
        let p2 = rng.gen_range(0..depot.routes[r2].len());

        let c1 = depot.routes[r1].customers[p1];
        let c2 = depot.routes[r2].customers[p2];
        depot.routes[r1].customers[p1] = c2;
        depot.routes[r2].customers[p2] = c1;

        depot.recompute_route(r1, self.problem);
        depot.recompute_route(r2, self.problem);
    }

    /// Move a swappable customer into a depot that lists it but does not serve it.
    ///
    /// Does nothing when no depot has such a customer.
    pub fn inter_depot_mutation<R: Rng + ?Sized>(&self, offspring: &mut Chromosome, rng: &mut R) {
        let candidates: Vec<(usize, Vec<usize>)> = offspring
            .depots
            .iter()
            .enumerate()
            .filter_map(|(d, depot)| {
                let missing: Vec<usize> = depot
                    .swappable
                    .iter()
                    .copied()
                    .filter(|&customer| !depot.contains(customer))
                    .collect();
                (!missing.is_empty()).then_some((d, missing))
            })
            .collect();

        let (target, missing) = match candidates.choose(rng) {
            Some(candidate) => candidate,
            None => return,
        };
        let customer = match missing.choose(rng) {
            Some(&customer) => customer,
            None => return,
        };

        offspring.remove_customer(customer, self.problem);
        insert_at_best_location(&mut offspring.depots[*target], customer, self.problem);
    }
}

/// Customers of a random route of the depot, empty if it has no routes.
fn random_route_customers<R: Rng + ?Sized>(depot: &Depot, rng: &mut R) -> Vec<usize> {
    depot
        .routes
        .choose(rng)
        .map(|route| route.customers.clone())
        .unwrap_or_default()
}
