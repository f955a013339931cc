//! Route construction for a single depot: greedy sequential packing followed by
//! one backward consolidation pass.

use crate::problem::Problem;
use crate::solution::{Depot, Route, RouteState};

/// Builds a depot's routes from its customer order.
pub struct RouteBuilder;

impl RouteBuilder {
    /// Replace the depot's routes with freshly constructed and consolidated ones.
    ///
    /// The depot may end up with more routes than vehicles allowed; that is
    /// accounted for by the chromosome's legality count, not here.
    pub fn build(depot: &mut Depot, problem: &Problem) {
        Self::pack(depot, problem);
        Self::consolidate(depot, problem);
        depot.state = RouteState::Built;
    }

    /// Walk the customer order and cut a new route whenever the next customer
    /// would break the capacity or duration limit.
    pub fn pack(depot: &mut Depot, problem: &Problem) {
        let spec = &problem.depots[depot.index];
        let order = std::mem::take(&mut depot.customers);
        let mut routes = Vec::new();

        let mut route = Route::new();
        let mut previous: Option<usize> = None;
        let mut previous_home = 0.0;

        for customer in order {
            let home = problem.depot_distance(depot.index, customer);
            let leg = match previous {
                Some(prev) => problem.get_distance(prev, customer),
                None => home,
            };
            let demand = problem.demand(customer);

            if spec.admits(route.length + leg + home, route.load + demand) {
                route.customers.push(customer);
                route.length += leg;
                route.load += demand;
                previous = Some(customer);
                previous_home = home;
            } else if previous.is_none() {
                // A first customer too far or too heavy on its own still gets a vehicle.
                route.customers.push(customer);
                route.length = home * 2.0;
                route.load = demand;
                routes.push(std::mem::take(&mut route));
            } else {
                route.length += previous_home;
                routes.push(std::mem::take(&mut route));

                route.customers.push(customer);
                route.length = home;
                route.load = demand;
                previous = Some(customer);
                previous_home = home;
            }
        }

        if !route.is_empty() {
            route.length += previous_home;
            routes.push(route);
        }

        depot.routes = routes;
    }

    /// Try moving the last customer of each route to the front of its successor,
    /// starting from the last pair, keeping only feasible improvements.
    pub fn consolidate(depot: &mut Depot, problem: &Problem) {
        let spec = &problem.depots[depot.index];
        let count = depot.routes.len();
        if count < 2 {
            return;
        }

        for i in (0..count - 1).rev() {
            let (head, tail) = depot.routes.split_at_mut(i + 1);
            let route = &mut head[i];
            let next = &mut tail[0];

            let customer = match route.customers.last() {
                Some(&c) => c,
                None => continue,
            };

            let cached_route = (route.length, route.load);
            let cached_next = (next.length, next.load);
            let cost = route.length + next.length;

            route.customers.pop();
            next.customers.insert(0, customer);
            route.recompute(depot.index, problem);
            next.recompute(depot.index, problem);

            if spec.admits(next.length, next.load) && route.length + next.length < cost {
                continue;
            }

            next.customers.remove(0);
            route.customers.push(customer);
            (route.length, route.load) = cached_route;
            (next.length, next.load) = cached_next;
        }

        depot.prune_empty_routes();
    }
}
