//! Basic example of using the MDVRP-GA library.

use mdvrp_ga::config::Config;
use mdvrp_ga::problem::Problem;
use mdvrp_ga::utils::{format_duration, save_solution};
use mdvrp_ga::MdvrpGa;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get instance path from command line or use default
    let args: Vec<String> = env::args().collect();
    let instance_path = if args.len() > 1 {
        &args[1]
    } else {
        "test_data/grid48"
    };

    println!("Loading problem from: {}", instance_path);
    let problem = Problem::from_file(instance_path)?;
    println!(
        "Loaded problem: {} with {} customers and {} depots",
        problem.name,
        problem.get_customer_count(),
        problem.get_depot_count()
    );

    let config = Config::new()
        .with_population_size(100)
        .with_max_generation(2000)
        .with_elite_ratio(0.02)
        .with_crossover_chance(0.6)
        .with_mutation_chance(0.2)
        .with_apprate(10)
        .with_seed(42);

    let mut algorithm = MdvrpGa::new(problem, config)?;
    let best = algorithm.run()?.clone();

    println!(
        "Search completed in {} ({:?})",
        format_duration(algorithm.run_time),
        algorithm.state
    );
    println!("{}", best);

    let output_path = format!("{}.res", algorithm.problem.name);
    println!("Saving solution to: {}", output_path);
    save_solution(&best, &algorithm.problem, &output_path)?;

    Ok(())
}
