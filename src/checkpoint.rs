//! Per-generation checkpointing: the external interface spec.md §6 treats
//! as "out of scope... interfaces only," supplied concretely per
//! `SPEC_FULL.md` §4.G. Grounded on `original_source/neat/population.py`'s
//! per-generation pickle dump of the best genome and `StatisticalData`,
//! ported to `serde`/`bincode` (both already teacher dependencies) rather
//! than Python's pickle. The wire format is explicitly not part of this
//! crate's core contract (spec.md §6), so failures here surface as plain
//! `std::io::Error` instead of a [`crate::error::NeatError`] variant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gene::{LinkGene, NodeGene};
use crate::genome::Genome;
use crate::ids::{GenomeId, LinkId, NodeId};
use crate::reporter::StatisticalData;

/// A serializable copy of a [`Genome`]'s genetic content. The live
/// `Genome` can't derive `Serialize` itself — it holds a shared handle to
/// the innovation registry (`Arc<Mutex<_>>`), which is run-local state,
/// not something a checkpoint should capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeSnapshot {
    pub id: GenomeId,
    pub fitness: f32,
    pub nodes: HashMap<NodeId, NodeGene>,
    pub links: HashMap<LinkId, LinkGene>,
    pub input_nodes: Vec<NodeId>,
    pub output_nodes: Vec<NodeId>,
}

impl From<&Genome> for GenomeSnapshot {
    fn from(genome: &Genome) -> Self {
        GenomeSnapshot {
            id: genome.id,
            fitness: genome.fitness,
            nodes: genome.nodes.clone(),
            links: genome.links.clone(),
            input_nodes: genome.input_nodes.clone(),
            output_nodes: genome.output_nodes.clone(),
        }
    }
}

/// The per-generation snapshot persisted by [`crate::population::Population::save_checkpoint`]:
/// the best genome found so far plus the run's accumulated statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub generation: usize,
    pub best_genome: GenomeSnapshot,
    pub stats: StatisticalData,
}

impl Checkpoint {
    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn from_bytes(bytes: &[u8]) -> std::io::Result<Self> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(checkpoint, _consumed)| checkpoint)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoolMutationParams, ConnectionScheme, EnumMutationParams, FloatMutationParams, GenomeSection};
    use crate::innovation::InnovationRegistry;
    use crate::reporter::GenerationStats;

    fn genome_cfg() -> GenomeSection {
        let float = FloatMutationParams {
            init_mean: 0.0,
            init_stdev: 1.0,
            min_value: -8.0,
            max_value: 8.0,
            mutation_chance: 0.0,
            replace_chance: 0.0,
            mutation_power: 0.0,
        };
        GenomeSection {
            inputs: 2,
            outputs: 1,
            hidden_nodes: 0,
            feed_forward: true,
            connection_scheme: ConnectionScheme::FullyConnected,
            node_addition_chance: 0.0,
            node_deletion_chance: 0.0,
            link_addition_chance: 0.0,
            link_deletion_chance: 0.0,
            link_toggle_chance: 0.0,
            bias: float.clone(),
            response: float.clone(),
            time_constant: float.clone(),
            weight: float,
            activator: EnumMutationParams {
                mutation_chance: 0.0,
                options: vec![crate::activation::Activator::Sigmoid],
                default: crate::activation::Activator::Sigmoid,
            },
            aggregator: EnumMutationParams {
                mutation_chance: 0.0,
                options: vec![crate::aggregation::Aggregator::Sum],
                default: crate::aggregation::Aggregator::Sum,
            },
            enabled: BoolMutationParams { mutation_chance: 0.0 },
            frozen: BoolMutationParams { mutation_chance: 0.0 },
        }
    }

    #[test]
    fn checkpoint_round_trips_through_bytes() {
        let cfg = genome_cfg();
        let innovation = InnovationRegistry::shared(cfg.inputs, cfg.outputs);
        let mut rng = rand::rng();
        let mut genome = Genome::new_initial(&cfg, innovation, &mut rng);
        genome.fitness = 3.9;

        let mut stats = StatisticalData::default();
        stats.push(GenerationStats {
            generation: 0,
            best_fitness: 3.9,
            mean_fitness: 2.1,
            stdev_fitness: 0.5,
            species_count: 1,
            elapsed_ms: 12,
        });

        let checkpoint = Checkpoint { generation: 0, best_genome: GenomeSnapshot::from(&genome), stats };

        let bytes = checkpoint.to_bytes().unwrap();
        let restored = Checkpoint::from_bytes(&bytes).unwrap();

        assert_eq!(restored.best_genome.id, genome.id);
        assert_eq!(restored.best_genome.fitness, 3.9);
        assert_eq!(restored.stats.generations.len(), 1);
    }
}
