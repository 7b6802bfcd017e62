//! NeuroEvolution of Augmenting Topologies: variable-topology genomes,
//! speciation and phenotype construction. The generational loop lives in
//! [`population`]; start there.

pub mod activation;
pub mod aggregation;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod gene;
pub mod genome;
pub mod ids;
pub mod innovation;
pub mod network;
pub mod population;
pub mod reporter;
pub mod reproduction;
pub mod species;
pub mod visualization;

pub use checkpoint::{Checkpoint, GenomeSnapshot};
pub use config::Parameters;
pub use error::{NeatError, Result};
pub use evaluator::ParallelEvaluator;
pub use genome::Genome;
pub use network::{CtrnnNetwork, FeedforwardNetwork, NetworkError, NeuralNetwork};
pub use population::Population;
pub use reporter::{GenerationStats, StatisticalData};
