//! Same XOR task as `demos/xor.rs`, but evolved with recurrence allowed
//! (`feed_forward = false`) and evaluated through the continuous-time
//! [`CtrnnNetwork`] phenotype instead of the layered feed-forward one.

use neat::config::{
    BoolMutationParams, ConnectionScheme, EnumMutationParams, EvaluationSection, FitnessCriterion, FloatMutationParams,
    GenomeSection, NeatSection, Parameters, ReproductionSection, SpeciationSection,
};
use neat::{CtrnnNetwork, Genome, NeuralNetwork, ParallelEvaluator, Population};

const XOR: [([f32; 2], f32); 4] = [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)];

fn xor_fitness(genome: &Genome, _context: &()) -> f32 {
    let mut net = CtrnnNetwork::from_genome(genome).with_time_step(0.05);
    let mut error = 0.0;

    for (input, expected) in XOR {
        net.reset_states();
        for _ in 0..20 {
            let _ = net.activate(&input).unwrap();
        }
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

fn xor_ctrnn_params() -> Parameters {
    Parameters {
        neat: NeatSection { reset_on_extinction: true },
        genome: GenomeSection {
            inputs: 2,
            outputs: 1,
            hidden_nodes: 0,
            feed_forward: false,
            connection_scheme: ConnectionScheme::FullyConnected,
            node_addition_chance: 0.07,
            node_deletion_chance: 0.01,
            link_addition_chance: 0.15,
            link_deletion_chance: 0.01,
            link_toggle_chance: 0.02,
            bias: float_params(0.0, 1.0, 0.4),
            response: float_params(1.0, 0.0, 0.0),
            time_constant: float_params(1.0, 0.3, 0.4),
            weight: float_params(0.0, 1.0, 0.9),
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
            enabled: BoolMutationParams { mutation_chance: 0.02 },
            frozen: BoolMutationParams { mutation_chance: 0.0 },
        },
        speciation: SpeciationSection {
            compatibility_disjoint_coefficient: 1.0,
            compatibility_weight_coefficient: 0.3,
            compatibility_threshold: 3.0,
            max_stagnation: 20,
            survival_rate: 0.3,
            elitism: 2,
            min_species_size: 2,
        },
        evaluation: EvaluationSection { fitness_threshold: 3.9, fitness_criterion: FitnessCriterion::Max },
        reproduction: ReproductionSection {
            crossover_rate: 0.75,
            inter_species_crossover_rate: 0.001,
            max_stagnation: 20,
            survival_rate: 0.3,
            elitism: 2,
            elitism_threshold: 5,
            min_species_size: 2,
            population: 150,
        },
    }
}

fn main() {
    let mut population = Population::new(xor_ctrnn_params(), 42);
    let evaluator = ParallelEvaluator::new();

    match population.run(&evaluator, &(), xor_fitness, Some(200), None) {
        Ok((best, stats)) => {
            println!(
                "generation {}: best fitness {:.4}, species {}",
                stats.generations.len(),
                best.fitness,
                stats.generations.last().map(|g| g.species_count).unwrap_or(0)
            );
            println!("node count: {}, link count: {}", best.nodes.len(), best.links.len());

            let mut net = CtrnnNetwork::from_genome(&best).with_time_step(0.05);
            for (input, expected) in XOR {
                net.reset_states();
                for _ in 0..20 {
                    let _ = net.activate(&input).unwrap();
                }
                let output = net.activate(&input).unwrap();
                println!("{:?} -> {:.3} (expected {})", input, output[0], expected);
            }
        }
        Err(e) => eprintln!("run failed: {e}"),
    }
}
