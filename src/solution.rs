//! Route and per-depot solution state.

use crate::problem::Problem;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// Length and load of a customer sequence served from `depot`, including the
/// legs from and back to the depot.
pub fn measure<I>(depot: usize, customers: I, problem: &Problem) -> (f64, f64)
where
    I: IntoIterator<Item = usize>,
{
    let mut length = 0.0;
    let mut load = 0.0;
    let mut previous = None;

    for customer in customers {
        length += match previous {
            None => problem.depot_distance(depot, customer),
            Some(prev) => problem.get_distance(prev, customer),
        };
        load += problem.demand(customer);
        previous = Some(customer);
    }

    if let Some(last) = previous {
        length += problem.depot_distance(depot, last);
    }

    (length, load)
}

/// Represents one vehicle route of a depot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    /// The sequence of customer indices (excluding the depot)
    pub customers: Vec<usize>,
    /// Total distance including both depot legs, valid after `recompute`
    pub length: f64,
    /// Sum of customer demands, valid after `recompute`
    pub load: f64,
}

impl Route {
    /// Create a new, empty route.
    pub fn new() -> Self {
        Route::default()
    }

    /// Create a route serving a single customer.
    pub fn with_customer(depot: usize, customer: usize, problem: &Problem) -> Self {
        let mut route = Route {
            customers: vec![customer],
            ..Route::default()
        };
        route.recompute(depot, problem);
        route
    }

    /// Recalculate length and load from the customer sequence.
    pub fn recompute(&mut self, depot: usize, problem: &Problem) {
        let (length, load) = measure(depot, self.customers.iter().copied(), problem);
        self.length = length;
        self.load = load;
    }

    /// Check if the route is empty.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Number of customers on the route.
    pub fn len(&self) -> usize {
        self.customers.len()
    }
}

/// Whether a depot's routes reflect its customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// The customer order changed and routes must be constructed again.
    NeedsRebuild,
    /// Routes are authoritative, the customer order has been consumed.
    Built,
}

/// A depot as seen by one chromosome: its own routes over shared customer data.
#[derive(Debug, Clone)]
pub struct Depot {
    /// Index into `Problem::depots`
    pub index: usize,
    /// Customer order consumed by the route builder
    pub customers: Vec<usize>,
    /// Customers close enough to be moved into this depot by inter-depot mutation
    pub swappable: Arc<[usize]>,
    pub routes: Vec<Route>,
    pub state: RouteState,
}

impl Depot {
    /// Create a depot awaiting route construction.
    pub fn new(index: usize, customers: Vec<usize>, swappable: Arc<[usize]>) -> Self {
        Depot {
            index,
            customers,
            swappable,
            routes: Vec::new(),
            state: RouteState::NeedsRebuild,
        }
    }

    /// Randomize the customer order before route construction.
    pub fn shuffle_customers<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.customers.shuffle(rng);
        self.state = RouteState::NeedsRebuild;
    }

    /// Recalculate the cached values of one route.
    pub fn recompute_route(&mut self, route: usize, problem: &Problem) {
        let index = self.index;
        self.routes[route].recompute(index, problem);
    }

    /// Drop routes that lost all their customers.
    pub fn prune_empty_routes(&mut self) {
        self.routes.retain(|route| !route.is_empty());
    }

    /// Locate a customer as `(route, position)`.
    pub fn find(&self, customer: usize) -> Option<(usize, usize)> {
        self.routes.iter().enumerate().find_map(|(r, route)| {
            route
                .customers
                .iter()
                .position(|&c| c == customer)
                .map(|pos| (r, pos))
        })
    }

    /// Check whether one of the routes serves the customer.
    pub fn contains(&self, customer: usize) -> bool {
        self.find(customer).is_some()
    }

    /// Remove a customer from its route, recomputing that route or dropping it
    /// when it becomes empty. Returns false if the depot does not serve the customer.
    pub fn remove_customer(&mut self, customer: usize, problem: &Problem) -> bool {
        match self.find(customer) {
            Some((r, pos)) => {
                self.routes[r].customers.remove(pos);
                if self.routes[r].is_empty() {
                    self.routes.remove(r);
                } else {
                    self.recompute_route(r, problem);
                }
                true
            }
            None => false,
        }
    }

    /// Total length of all routes.
    pub fn total_length(&self) -> f64 {
        self.routes.iter().map(|route| route.length).sum()
    }

    /// Iterate over every routed customer.
    pub fn routed_customers(&self) -> impl Iterator<Item = usize> + '_ {
        self.routes.iter().flat_map(|route| route.customers.iter().copied())
    }
}

impl fmt::Display for Depot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Depot #{} ({} routes)", self.index, self.routes.len())?;
        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {}: {:?} (Load: {:.2}, Length: {:.2})",
                i, route.customers, route.load, route.length
            )?;
        }
        Ok(())
    }
}

/// Assign every customer to its nearest depot and mark the customers lying
/// within `bound` (relative to their nearest-depot distance) of more than one
/// depot as swappable for each of those depots.
///
/// Ties go to the depot listed first.
pub fn assign_customers(problem: &Problem, bound: f64) -> Vec<Depot> {
    let depot_count = problem.get_depot_count();
    let mut assigned: Vec<Vec<usize>> = vec![Vec::new(); depot_count];
    let mut swappable: Vec<Vec<usize>> = vec![Vec::new(); depot_count];

    if depot_count == 0 {
        return Vec::new();
    }

    for customer in 0..problem.get_customer_count() {
        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;
        for depot in 0..depot_count {
            let distance = problem.depot_distance(depot, customer);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest = depot;
            }
        }
        assigned[nearest].push(customer);

        let candidates: Vec<usize> = (0..depot_count)
            .filter(|&depot| {
                problem.depot_distance(depot, customer) - nearest_distance
                    <= bound * nearest_distance
            })
            .collect();
        if candidates.len() > 1 {
            for depot in candidates {
                swappable[depot].push(customer);
            }
        }
    }

    assigned
        .into_iter()
        .zip(swappable)
        .enumerate()
        .map(|(index, (customers, swappable))| Depot::new(index, customers, swappable.into()))
        .collect()
}
