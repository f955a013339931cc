//! Tests for population initialization, statistics and elitism.

use mdvrp_ga::chromosome::{Chromosome, PenaltyPolicy};
use mdvrp_ga::config::Config;
use mdvrp_ga::error::Error;
use mdvrp_ga::population::Population;
use mdvrp_ga::problem::{Customer, DepotSpec, Problem};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_test_problem() -> Problem {
    let depots = vec![
        DepotSpec::new(1, 0.0, 0.0, 15.0, 0.0),
        DepotSpec::new(2, 50.0, 0.0, 15.0, 0.0),
    ];
    let customers = (0..12)
        .map(|i| {
            let x = (i % 6) as f64 * 10.0;
            let y = (i / 6) as f64 * 10.0 + 5.0;
            Customer::new(i + 1, x, y, 4.0)
        })
        .collect();

    Problem::new("Grid".to_string(), depots, customers, 3)
}

fn chromosome(fitness: f64, too_many_routes: usize) -> Chromosome {
    let mut chromosome = Chromosome::new(Vec::new());
    chromosome.fitness = fitness;
    chromosome.too_many_routes = too_many_routes;
    chromosome
}

#[test]
fn test_initialize_population() {
    let problem = create_test_problem();
    let config = Config::new().with_population_size(10);
    let penalty = PenaltyPolicy::new(config.penalty_weight, config.penalty_time_constant);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let population = Population::initialize(&problem, &config, &penalty, &mut rng);

    assert_eq!(population.len(), 10);
    for c in &population.chromosomes {
        assert!(c.conserves_customers(problem.get_customer_count()));
        assert!(c.fitness.is_finite());
        assert!(c.fitness >= c.total_distance());
        // Customers stay with their nearest depot at first
        assert!(c.depots[0].routed_customers().all(|i| problem.customers[i].x <= 25.0));
    }
}

#[test]
fn test_best_legal_and_statistics() {
    let population = Population::new(vec![
        chromosome(5.0, 1),
        chromosome(9.0, 0),
        chromosome(7.0, 0),
        chromosome(3.0, 2),
    ]);

    assert_eq!(population.best_legal().map(|c| c.fitness), Some(7.0));
    assert_eq!(population.best_legal_fitness(), Some(7.0));
    assert_eq!(population.legal_count(), 2);
    assert!((population.mean_fitness() - 6.0).abs() < 1e-12);

    let sorted: Vec<f64> = population
        .sorted_by_fitness()
        .iter()
        .map(|c| c.fitness)
        .collect();
    assert_eq!(sorted, vec![3.0, 5.0, 7.0, 9.0]);
}

#[test]
fn test_no_legal_chromosome() {
    let population = Population::new(vec![chromosome(1.0, 1), chromosome(2.0, 3)]);

    assert!(population.best_legal().is_none());
    match population.require_best_legal() {
        Err(Error::NoLegalSolution { population_size }) => assert_eq!(population_size, 2),
        other => panic!("unexpected result: {:?}", other.map(|c| c.fitness)),
    }
}

#[test]
fn test_elitism_keeps_best_previous() {
    let previous = Population::new(vec![
        chromosome(50.0, 0),
        chromosome(10.0, 0),
        chromosome(30.0, 0),
        chromosome(20.0, 0),
    ]);
    let offspring = vec![
        chromosome(100.0, 0),
        chromosome(101.0, 0),
        chromosome(102.0, 0),
        chromosome(103.0, 0),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let next = previous.next_generation(offspring, 2, &mut rng);

    assert_eq!(next.len(), 4);
    let mut fitness: Vec<f64> = next.chromosomes.iter().map(|c| c.fitness).collect();
    fitness.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(fitness[0], 10.0);
    assert_eq!(fitness[1], 20.0);
    assert!(fitness[2] >= 100.0 && fitness[3] >= 100.0);
}

#[test]
fn test_elitism_count_larger_than_population() {
    let previous = Population::new(vec![chromosome(1.0, 0), chromosome(2.0, 0)]);
    let offspring = vec![chromosome(10.0, 0), chromosome(11.0, 0)];
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let next = previous.next_generation(offspring, 5, &mut rng);
    let mut fitness: Vec<f64> = next.chromosomes.iter().map(|c| c.fitness).collect();
    fitness.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(fitness, vec![1.0, 2.0]);
}
