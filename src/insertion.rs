//! Insertion-cost evaluation shared by crossover repair and the relocating mutations.

use crate::problem::Problem;
use crate::solution::{measure, Depot, Route};
use std::iter;

/// Outcome of inserting a customer at one position of one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertionCell {
    /// Route length with the customer inserted
    pub length: f64,
    /// Increase over the route's current length
    pub cost: f64,
    /// Whether the extended route respects capacity and duration
    pub feasible: bool,
}

/// Insertion outcomes for one customer, indexed `[route][position]`.
#[derive(Debug, Clone)]
pub struct InsertionTable {
    pub cells: Vec<Vec<InsertionCell>>,
}

impl InsertionTable {
    /// Evaluate every position of every route of `depot` for `customer`.
    ///
    /// Each candidate route is measured from scratch; cached route values are
    /// not relied upon.
    pub fn evaluate(depot: &Depot, customer: usize, problem: &Problem) -> Self {
        let spec = &problem.depots[depot.index];

        let cells = depot
            .routes
            .iter()
            .map(|route| {
                let (current, _) = measure(depot.index, route.customers.iter().copied(), problem);
                (0..=route.customers.len())
                    .map(|pos| {
                        let tentative = route.customers[..pos]
                            .iter()
                            .copied()
                            .chain(iter::once(customer))
                            .chain(route.customers[pos..].iter().copied());
                        let (length, load) = measure(depot.index, tentative, problem);
                        InsertionCell {
                            length,
                            cost: length - current,
                            feasible: spec.admits(length, load),
                        }
                    })
                    .collect()
            })
            .collect();

        InsertionTable { cells }
    }

    /// The cheapest feasible `(route, position)`.
    pub fn best_feasible(&self) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;

        for (r, row) in self.cells.iter().enumerate() {
            for (pos, cell) in row.iter().enumerate() {
                if cell.feasible && best.map_or(true, |(_, cost)| cell.cost < cost) {
                    best = Some(((r, pos), cell.cost));
                }
            }
        }

        best.map(|(location, _)| location)
    }

    /// The first feasible `(route, position)` in route and position order.
    pub fn first_feasible(&self) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|cell| cell.feasible)
                .map(|pos| (r, pos))
        })
    }
}

/// Insert a customer at the cheapest feasible position of the depot, or on a
/// new route of its own when no position is feasible.
pub fn insert_at_best_location(depot: &mut Depot, customer: usize, problem: &Problem) {
    let location = InsertionTable::evaluate(depot, customer, problem).best_feasible();
    insert_at(depot, customer, location, problem);
}

/// Insert a customer at the first feasible position of the depot, or on a new
/// route of its own when no position is feasible.
pub fn insert_at_first_feasible_location(depot: &mut Depot, customer: usize, problem: &Problem) {
    let location = InsertionTable::evaluate(depot, customer, problem).first_feasible();
    insert_at(depot, customer, location, problem);
}

fn insert_at(
    depot: &mut Depot,
    customer: usize,
    location: Option<(usize, usize)>,
    problem: &Problem,
) {
    match location {
        Some((route, pos)) => {
            depot.routes[route].customers.insert(pos, customer);
            depot.recompute_route(route, problem);
        }
        None => depot
            .routes
            .push(Route::with_customer(depot.index, customer, problem)),
    }
}
