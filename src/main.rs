//! Command line entry point: load an instance, evolve, save the best legal solution.

use anyhow::Context;
use clap::Parser;
use log::info;
use mdvrp_ga::config::Config;
use mdvrp_ga::problem::Problem;
use mdvrp_ga::utils::save_solution;
use mdvrp_ga::MdvrpGa;
use std::path::PathBuf;

/// Solve a multi-depot vehicle routing instance with a genetic algorithm.
#[derive(Debug, Parser)]
#[command(name = "mdvrp-ga", version, about)]
struct Args {
    /// Instance file in the Cordeau MDVRP layout; defaults to the configuration's `input_file`
    instance: Option<PathBuf>,

    /// JSON or YAML configuration file; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the solution (`.json` for a JSON report)
    #[arg(short, long, default_value = "solutions/solution.res")]
    output: PathBuf,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of generations
    #[arg(long)]
    generations: Option<usize>,

    /// Override the population size
    #[arg(long)]
    population: Option<usize>,

    /// Override the number of worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Override the early stop threshold
    #[arg(long)]
    stop_threshold: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("cannot load configuration {}", path.display()))?,
        None => Config::new(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(generations) = args.generations {
        config = config.with_max_generation(generations);
    }
    if let Some(size) = args.population {
        config = config.with_population_size(size);
    }
    if let Some(threads) = args.threads {
        config = config.with_worker_threads(threads);
    }
    if let Some(threshold) = args.stop_threshold {
        config = config.with_stop_threshold(threshold);
    }

    let instance = args
        .instance
        .clone()
        .or_else(|| config.input_file.clone())
        .context("no instance given on the command line or as input_file in the configuration")?;
    let problem = Problem::from_file(&instance)
        .with_context(|| format!("cannot load instance {}", instance.display()))?;
    info!(
        "Loaded '{}' with {} customers and {} depots (max {} vehicles per depot)",
        problem.name,
        problem.get_customer_count(),
        problem.get_depot_count(),
        problem.max_vehicles_per_depot
    );

    let mut algorithm = MdvrpGa::new(problem, config)?;

    let best = algorithm.run()?.clone();
    info!(
        "Best legal solution: distance {:.2} over {} routes",
        best.total_distance(),
        best.depots.iter().map(|d| d.routes.len()).sum::<usize>()
    );

    save_solution(&best, &algorithm.problem, &args.output)
        .with_context(|| format!("cannot write solution {}", args.output.display()))?;
    info!("Solution written to {}", args.output.display());

    Ok(())
}
