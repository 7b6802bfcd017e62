//! Integration test for spec.md §8 scenario 1: a full `Population::run`
//! loop should be able to clear the XOR fitness threshold within a
//! bounded number of generations. Kept here (rather than as a
//! `#[cfg(test)]` module) since it drives the whole crate end to end
//! instead of one component in isolation.

use neat::config::{
    BoolMutationParams, ConnectionScheme, EnumMutationParams, EvaluationSection, FitnessCriterion, FloatMutationParams,
    GenomeSection, NeatSection, Parameters, ReproductionSection, SpeciationSection,
};
use neat::{FeedforwardNetwork, Genome, NeuralNetwork, ParallelEvaluator, Population};

const XOR: [([f32; 2], f32); 4] = [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)];

fn xor_fitness(genome: &Genome, _context: &()) -> f32 {
    let mut net = FeedforwardNetwork::from_genome(genome);
    let mut error = 0.0;
    for (input, expected) in XOR {
        let output = net.activate(&input).unwrap();
        error += (output[0] - expected).powi(2);
    }
    4.0 - error
}

fn float_params(init_mean: f32, init_stdev: f32, mutation_chance: f32) -> FloatMutationParams {
    FloatMutationParams {
        init_mean,
        init_stdev,
        min_value: -8.0,
        max_value: 8.0,
        mutation_chance,
        replace_chance: 0.1,
        mutation_power: 0.5,
    }
}

fn xor_params(population: usize) -> Parameters {
    Parameters {
        neat: NeatSection { reset_on_extinction: true },
        genome: GenomeSection {
            inputs: 2,
            outputs: 1,
            hidden_nodes: 0,
            feed_forward: true,
            connection_scheme: ConnectionScheme::FullyConnected,
            node_addition_chance: 0.03,
            node_deletion_chance: 0.01,
            link_addition_chance: 0.05,
            link_deletion_chance: 0.01,
            link_toggle_chance: 0.01,
            bias: float_params(0.0, 1.0, 0.7),
            response: float_params(1.0, 0.0, 0.0),
            time_constant: float_params(1.0, 0.0, 0.0),
            weight: float_params(0.0, 1.0, 0.8),
            activator: EnumMutationParams {
                mutation_chance: 0.0,
                options: vec![neat::activation::Activator::Sigmoid],
                default: neat::activation::Activator::Sigmoid,
            },
            aggregator: EnumMutationParams {
                mutation_chance: 0.0,
                options: vec![neat::aggregation::Aggregator::Sum],
                default: neat::aggregation::Aggregator::Sum,
            },
            enabled: BoolMutationParams { mutation_chance: 0.01 },
            frozen: BoolMutationParams { mutation_chance: 0.0 },
        },
        speciation: SpeciationSection {
            compatibility_disjoint_coefficient: 1.0,
            compatibility_weight_coefficient: 0.5,
            compatibility_threshold: 3.0,
            max_stagnation: 15,
            survival_rate: 0.2,
            elitism: 2,
            min_species_size: 2,
        },
        evaluation: EvaluationSection { fitness_threshold: 3.9, fitness_criterion: FitnessCriterion::Max },
        reproduction: ReproductionSection {
            crossover_rate: 0.75,
            inter_species_crossover_rate: 0.001,
            max_stagnation: 15,
            survival_rate: 0.2,
            elitism: 2,
            elitism_threshold: 5,
            min_species_size: 2,
            population,
        },
    }
}

#[test]
fn xor_is_solved_within_300_generations_at_seed_42() {
    let mut population = Population::new(xor_params(150), 42);
    let evaluator = ParallelEvaluator::new();

    let (best, stats) = population
        .run(&evaluator, &(), xor_fitness, Some(300), None)
        .expect("a 150-genome XOR population should not go extinct within 300 generations");

    assert!(best.fitness >= 3.9, "best genome only reached fitness {}", best.fitness);
    assert!(stats.generations.len() <= 301);
}

#[test]
fn every_genome_in_the_final_species_partition_is_accounted_for() {
    let mut population = Population::new(xor_params(40), 7);
    population.reset();
    assert_eq!(population.genome_count(), 40);

    let total_members: usize = population.species().iter().map(|s| s.size()).sum();
    assert_eq!(total_members, 40);
}
