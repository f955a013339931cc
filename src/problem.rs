//! Problem definition and data structures for the MDVRP.

use crate::error::{Error, Result};
use crate::utils::euclidean_distance;
use serde::{Deserialize, Serialize};
use std::f64;
use std::fs;
use std::path::Path;

/// A customer to be served by exactly one vehicle of one depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub demand: f64,
}

impl Customer {
    /// Create a new customer.
    pub fn new(id: usize, x: f64, y: f64, demand: f64) -> Self {
        Customer { id, x, y, demand }
    }

    /// Calculate the Euclidean distance between two customers.
    pub fn distance(&self, other: &Customer) -> f64 {
        euclidean_distance(self.x, self.y, other.x, other.y)
    }
}

/// A depot together with the limits of the vehicles starting from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotSpec {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// Capacity of every vehicle of this depot
    pub max_vehicle_load: f64,
    /// Maximum length of a single route, `f64::INFINITY` when unlimited
    pub max_route_duration: f64,
}

impl DepotSpec {
    /// Create a new depot. A route duration of zero means unlimited.
    pub fn new(id: usize, x: f64, y: f64, max_vehicle_load: f64, max_route_duration: f64) -> Self {
        let max_route_duration = if max_route_duration == 0.0 {
            f64::INFINITY
        } else {
            max_route_duration
        };

        DepotSpec {
            id,
            x,
            y,
            max_vehicle_load,
            max_route_duration,
        }
    }

    /// Calculate the Euclidean distance from the depot to a customer.
    pub fn distance(&self, customer: &Customer) -> f64 {
        euclidean_distance(self.x, self.y, customer.x, customer.y)
    }

    /// Check whether a route with the given length and load fits this depot's vehicles.
    pub fn admits(&self, length: f64, load: f64) -> bool {
        load <= self.max_vehicle_load && length <= self.max_route_duration
    }
}

/// Represents an MDVRP problem instance.
///
/// Customers and depots are stored once; the rest of the crate refers to them
/// by their position in `customers` and `depots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub depots: Vec<DepotSpec>,
    pub customers: Vec<Customer>,
    pub max_vehicles_per_depot: usize,
    /// Customer to customer distances
    pub distance_matrix: Vec<Vec<f64>>,
    /// Depot to customer distances, indexed `[depot][customer]`
    pub depot_distances: Vec<Vec<f64>>,
}

impl Problem {
    /// Create a new MDVRP problem.
    pub fn new(
        name: String,
        depots: Vec<DepotSpec>,
        customers: Vec<Customer>,
        max_vehicles_per_depot: usize,
    ) -> Self {
        let distance_matrix = Self::compute_distance_matrix(&customers);
        let depot_distances = depots
            .iter()
            .map(|depot| customers.iter().map(|c| depot.distance(c)).collect())
            .collect();

        Problem {
            name,
            depots,
            customers,
            max_vehicles_per_depot,
            distance_matrix,
            depot_distances,
        }
    }

    /// Distance between two customer indices.
    pub fn get_distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    /// Distance between a depot index and a customer index.
    pub fn depot_distance(&self, depot: usize, customer: usize) -> f64 {
        self.depot_distances[depot][customer]
    }

    /// Demand of a customer index.
    pub fn demand(&self, customer: usize) -> f64 {
        self.customers[customer].demand
    }

    /// Get the number of customers.
    pub fn get_customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Get the number of depots.
    pub fn get_depot_count(&self) -> usize {
        self.depots.len()
    }

    fn compute_distance_matrix(customers: &[Customer]) -> Vec<Vec<f64>> {
        let n = customers.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = customers[i].distance(&customers[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Load a problem from a file in the Cordeau MDVRP layout.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());

        Self::parse(name, &text)
    }

    /// Parse a problem from the text of an instance file.
    ///
    /// Layout: `m n t` (an optional leading problem type is skipped), then `t`
    /// lines `D Q`, then `n` customer lines `i x y d q`, then `t` depot lines
    /// `i x y`. Depots are numbered from 1 in file order.
    pub fn parse(name: String, text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let mut next_numbers = |expected: usize, what: &str| -> Result<(usize, Vec<f64>)> {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| Error::parse(0, format!("unexpected end of file, expected {}", what)))?;
            let numbers = line
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<f64>()
                        .map_err(|_| Error::parse(line_no, format!("'{}' is not a number", token)))
                })
                .collect::<Result<Vec<f64>>>()?;
            if numbers.len() < expected {
                return Err(Error::parse(
                    line_no,
                    format!("{} needs {} values, found {}", what, expected, numbers.len()),
                ));
            }
            Ok((line_no, numbers))
        };

        let (header_line, header) = next_numbers(3, "header")?;
        let header = if header.len() >= 4 { &header[1..4] } else { &header[0..3] };
        let max_vehicles_per_depot = whole_number(header[0], header_line)?;
        let customer_count = whole_number(header[1], header_line)?;
        let depot_count = whole_number(header[2], header_line)?;

        // Counts are not trusted for allocation; a short file ends in a parse error.
        let mut limits = Vec::new();
        for _ in 0..depot_count {
            let (_, numbers) = next_numbers(2, "depot limits")?;
            limits.push((numbers[0], numbers[1]));
        }

        let mut customers = Vec::new();
        for _ in 0..customer_count {
            let (line_no, numbers) = next_numbers(5, "customer")?;
            customers.push(Customer::new(
                whole_number(numbers[0], line_no)?,
                numbers[1],
                numbers[2],
                numbers[4],
            ));
        }

        let mut depots = Vec::new();
        for (i, (duration, load)) in limits.into_iter().enumerate() {
            let (_, numbers) = next_numbers(3, "depot position")?;
            depots.push(DepotSpec::new(i + 1, numbers[1], numbers[2], load, duration));
        }

        Ok(Problem::new(name, depots, customers, max_vehicles_per_depot))
    }
}

/// Read a count or id, rejecting negative, fractional and out of range values.
fn whole_number(value: f64, line: usize) -> Result<usize> {
    if value < 0.0 || value.fract() != 0.0 || value >= usize::MAX as f64 {
        return Err(Error::parse(
            line,
            format!("{} is not a valid count or id", value),
        ));
    }
    Ok(value as usize)
}
