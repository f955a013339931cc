//! Integration tests for the full MDVRP genetic algorithm.

use mdvrp_ga::config::{Config, ConfigWarning};
use mdvrp_ga::error::Error;
use mdvrp_ga::problem::{Customer, DepotSpec, Problem};
use mdvrp_ga::{MdvrpGa, SolverState};
use std::path::Path;

/// Creates a moderate size test problem with two depots and a grid of customers.
fn create_moderate_problem(max_vehicles: usize) -> Problem {
    let depots = vec![
        DepotSpec::new(1, 20.0, 50.0, 10.0, 0.0),
        DepotSpec::new(2, 80.0, 50.0, 10.0, 0.0),
    ];

    // 24 customers in a 6 x 4 grid
    let mut customers = Vec::new();
    for i in 0..6 {
        for j in 0..4 {
            let id = customers.len() + 1;
            let x = i as f64 * 20.0;
            let y = j as f64 * 20.0 + 20.0;
            let demand = 1.0 + (id % 3) as f64;
            customers.push(Customer::new(id, x, y, demand));
        }
    }

    Problem::new("ModerateTestProblem".to_string(), depots, customers, max_vehicles)
}

fn small_config() -> Config {
    Config::new()
        .with_population_size(12)
        .with_max_generation(20)
        .with_report_interval(5)
        .with_worker_threads(2)
        .with_seed(7)
}

#[test]
fn test_algorithm_initialization() {
    let problem = create_moderate_problem(10);
    let mut algorithm = MdvrpGa::new(problem, small_config()).unwrap();
    assert_eq!(algorithm.state, SolverState::Initializing);

    algorithm.initialize();

    assert_eq!(algorithm.state, SolverState::Evolving);
    assert_eq!(algorithm.population.len(), 12);
    assert!(algorithm.population.best_legal().is_some());
}

#[test]
fn test_algorithm_short_run() {
    let problem = create_moderate_problem(10);
    let mut algorithm = MdvrpGa::new(problem, small_config()).unwrap();

    let best = algorithm.run().unwrap().clone();

    assert_eq!(algorithm.state, SolverState::MaxGenerationReached);
    assert_eq!(algorithm.generation, 20);
    assert_eq!(algorithm.population.len(), 12);

    assert!(best.is_legal());
    assert!(best.conserves_customers(24));
    assert!((best.fitness - best.total_distance()).abs() < 1e-9);
    for depot in &best.depots {
        let spec = &algorithm.problem.depots[depot.index];
        for route in &depot.routes {
            assert!(!route.customers.is_empty());
            assert!(spec.admits(route.length, route.load));
        }
    }
}

#[test]
fn test_early_stop_at_first_checkpoint() {
    let problem = create_moderate_problem(10);
    let config = small_config().with_stop_threshold(1e12);
    let mut algorithm = MdvrpGa::new(problem, config).unwrap();

    assert!(algorithm.run().is_ok());
    assert_eq!(algorithm.state, SolverState::EarlyStopped { generation: 5 });
    assert_eq!(algorithm.generation, 5);
}

#[test]
fn test_elitism_never_loses_best() {
    let problem = create_moderate_problem(10);
    let mut algorithm = MdvrpGa::new(problem, small_config().with_elite_ratio(0.1)).unwrap();
    algorithm.initialize();

    let mut best = algorithm.population.sorted_by_fitness()[0].fitness;
    for generation in 1..=10 {
        algorithm.generation = generation;
        algorithm.evolve_generation();
        let current = algorithm.population.sorted_by_fitness()[0].fitness;
        assert!(current <= best + 1e-9);
        best = current;
    }
}

#[test]
fn test_odd_population_is_adjusted() {
    let problem = create_moderate_problem(10);
    let config = small_config().with_population_size(11).with_max_generation(2);
    let mut algorithm = MdvrpGa::new(problem, config).unwrap();

    assert_eq!(
        algorithm.warnings,
        vec![ConfigWarning::OddPopulationSize {
            requested: 11,
            adjusted: 10
        }]
    );
    assert!(algorithm.run().is_ok());
    assert_eq!(algorithm.population.len(), 10);
}

#[test]
fn test_no_legal_solution() {
    let problem = create_moderate_problem(0);
    let mut algorithm = MdvrpGa::new(problem, small_config().with_max_generation(3)).unwrap();

    match algorithm.run() {
        Err(Error::NoLegalSolution { population_size }) => assert_eq!(population_size, 12),
        other => panic!("unexpected result: {:?}", other.map(|c| c.fitness)),
    }
}

#[test]
fn test_invalid_setup_is_rejected() {
    let problem = create_moderate_problem(10);
    assert!(matches!(
        MdvrpGa::new(problem, small_config().with_population_size(1)),
        Err(Error::InvalidConfig(_))
    ));

    let problem = create_moderate_problem(10);
    assert!(matches!(
        MdvrpGa::new(problem, small_config().with_crossover_chance(1.5)),
        Err(Error::InvalidConfig(_))
    ));

    let problem = Problem::new("Empty".to_string(), Vec::new(), Vec::new(), 1);
    assert!(matches!(
        MdvrpGa::new(problem, small_config()),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_run_on_instance_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data/grid48");
    let problem = Problem::from_file(&path).unwrap();
    assert_eq!(problem.get_customer_count(), 48);
    assert_eq!(problem.get_depot_count(), 4);

    let config = Config::new()
        .with_population_size(20)
        .with_max_generation(30)
        .with_report_interval(10)
        .with_worker_threads(2)
        .with_seed(11);
    let mut algorithm = MdvrpGa::new(problem, config).unwrap();
    let best = algorithm.run().unwrap();

    assert!(best.is_legal());
    assert!(best.conserves_customers(48));
}

#[test]
fn test_config_file_keeps_defaults() {
    let path = std::env::temp_dir().join(format!("mdvrp_ga_config_{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "population_size": 40, "seed": 3, "stop_threshold": 600.5 }"#)
        .unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.population_size, 40);
    assert_eq!(config.seed, Some(3));
    assert_eq!(config.stop_threshold, Some(600.5));
    assert_eq!(config.max_generation, 3000);
    assert_eq!(config.apprate, 10);
    assert_eq!(config.worker_threads, None);
    assert_eq!(config.elitism_count(), 0);
}

#[test]
fn test_yaml_config_file() {
    let path = std::env::temp_dir().join(format!("mdvrp_ga_config_{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "input_file: test_data/grid48\n\
         bound: 0.5\n\
         tournament_selection_number: 0.7\n\
         crossover_insertion_number: 0.9\n\
         APPRATE: 25\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.input_file, Some(Path::new("test_data/grid48").to_path_buf()));
    assert_eq!(config.bound, 0.5);
    assert_eq!(config.tournament_selection_number, 0.7);
    assert_eq!(config.crossover_insertion_number, 0.9);
    assert_eq!(config.apprate, 25);
    assert_eq!(config.population_size, 100);
}

#[test]
fn test_malformed_yaml_config() {
    let path = std::env::temp_dir().join(format!("mdvrp_ga_broken_{}.yml", std::process::id()));
    std::fs::write(&path, "bound: [not, a, number]\n").unwrap();

    let result = Config::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(Error::Yaml(_))));
}

#[test]
fn test_stops_once_reached_fitness_is_seen_again() {
    let reached_at = 7;
    let interval = 5;
    let config = small_config()
        .with_worker_threads(1)
        .with_elite_ratio(0.2)
        .with_report_interval(interval);

    // Single worker runs are reproducible for a fixed seed
    let mut reference = MdvrpGa::new(
        create_moderate_problem(10),
        config.clone().with_max_generation(reached_at),
    )
    .unwrap();
    reference.run().unwrap();
    let threshold = reference.population.best_legal_fitness().unwrap();

    let mut algorithm = MdvrpGa::new(
        create_moderate_problem(10),
        config.with_max_generation(40).with_stop_threshold(threshold),
    )
    .unwrap();
    let best = algorithm.run().unwrap().fitness;

    let next_checkpoint = (reached_at + interval - 1) / interval * interval;
    match algorithm.state {
        SolverState::EarlyStopped { generation } => {
            assert!(generation <= next_checkpoint);
            assert_eq!(generation % interval, 0);
            assert_eq!(algorithm.generation, generation);
        }
        state => panic!("expected an early stop, got {:?}", state),
    }
    assert!(best <= threshold);
}
