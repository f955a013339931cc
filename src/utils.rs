//! Geometry, sampling and reporting helpers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chromosome::Chromosome;
use crate::error::Result;
use crate::problem::Problem;

/// Euclidean distance between two points.
pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

/// Pick a random inclusive sub-range `(start, end)` of `0..len`, `start <= end`.
///
/// `len` must be positive.
pub fn random_subrange<R: Rng + ?Sized>(len: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.gen_range(0..len);
    let b = rng.gen_range(0..len);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pick two distinct indices of `0..len`, or `None` when `len < 2`.
pub fn two_distinct<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }
    let first = rng.gen_range(0..len);
    let mut second = rng.gen_range(0..len - 1);
    if second >= first {
        second += 1;
    }
    Some((first, second))
}

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// One vehicle route of a finished solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReport {
    pub depot_id: usize,
    pub route_number: usize,
    pub length: f64,
    pub load: f64,
    pub customers: Vec<usize>,
}

/// A finished solution in terms of the instance's own ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionReport {
    pub instance: String,
    pub total_distance: f64,
    pub fitness: f64,
    pub routes: Vec<RouteReport>,
}

impl SolutionReport {
    /// Describe a chromosome using depot and customer ids from the problem.
    pub fn new(chromosome: &Chromosome, problem: &Problem) -> Self {
        let routes = chromosome
            .depots
            .iter()
            .flat_map(|depot| {
                let depot_id = problem.depots[depot.index].id;
                depot
                    .routes
                    .iter()
                    .enumerate()
                    .map(move |(i, route)| RouteReport {
                        depot_id,
                        route_number: i + 1,
                        length: route.length,
                        load: route.load,
                        customers: route
                            .customers
                            .iter()
                            .map(|&c| problem.customers[c].id)
                            .collect(),
                    })
            })
            .collect();

        SolutionReport {
            instance: problem.name.clone(),
            total_distance: chromosome.total_distance(),
            fitness: chromosome.fitness,
            routes,
        }
    }

    /// Write the tab separated result layout.
    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{:.2}", self.total_distance)?;

        for route in &self.routes {
            write!(
                out,
                "{}\t{}\t{:.2}\t{}\t",
                route.depot_id, route.route_number, route.length, route.load
            )?;
            for customer in &route.customers {
                write!(out, "{} ", customer)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

/// Save a solution to a file. Paths ending in `.json` get a JSON report,
/// everything else the tab separated result layout.
pub fn save_solution<P: AsRef<Path>>(
    chromosome: &Chromosome,
    problem: &Problem,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let report = SolutionReport::new(chromosome, problem);
    let mut file = BufWriter::new(File::create(path)?);

    if path.extension().map_or(false, |ext| ext == "json") {
        serde_json::to_writer_pretty(&mut file, &report)?;
        writeln!(file)?;
    } else {
        report.write_text(&mut file)?;
    }
    file.flush()?;

    Ok(())
}
