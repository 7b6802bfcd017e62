//! Evolves a feed-forward XOR solver, matching spec.md §8 scenario 1:
//! `inputs=2, outputs=1`, `population >= 100`, `fitness_threshold=3.9`.

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

fn xor_params() -> Parameters {
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
            population: 150,
        },
    }
}

fn main() {
    let mut population = Population::new(xor_params(), 42);
    let evaluator = ParallelEvaluator::new();

    match population.run(&evaluator, &(), xor_fitness, Some(300), None) {
        Ok((best, stats)) => {
            println!("solved in {} generations, fitness {:.4}", stats.generations.len(), best.fitness);
            let mut net = FeedforwardNetwork::from_genome(&best);
            for (input, expected) in XOR {
                let output = net.activate(&input).unwrap();
                println!("{:?} -> {:.3} (expected {})", input, output[0], expected);
            }
        }
        Err(e) => eprintln!("run failed: {e}"),
    }
}
