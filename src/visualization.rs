//! Debug-only topology dump. Grounded on the teacher's `src/genome/
//! visualization.rs`, which built a `petgraph::StableGraph` from a
//! genome for ad-hoc inspection; generalized here to only include
//! enabled links, matching what a phenotype would actually evaluate.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};

use crate::genome::Genome;
use crate::ids::NodeId;

/// Builds a `petgraph` graph mirroring a genome's enabled topology, node
/// IDs as weights so the caller can label a rendered graph.
pub fn generate_graph(genome: &Genome) -> StableGraph<NodeId, ()> {
    let mut graph = StableGraph::new();
    let mut indices: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(genome.nodes.len());

    for &node_id in genome.nodes.keys() {
        indices.insert(node_id, graph.add_node(node_id));
    }

    for link in genome.enabled_links() {
        let source = indices[&link.in_node];
        let target = indices[&link.out_node];
        graph.add_edge(source, target, ());
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoolMutationParams, ConnectionScheme, EnumMutationParams, FloatMutationParams, GenomeSection};
    use crate::innovation::InnovationRegistry;

    #[test]
    fn graph_has_one_node_per_gene_and_one_edge_per_enabled_link() {
        let cfg = GenomeSection {
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
            bias: FloatMutationParams {
                init_mean: 0.0,
                init_stdev: 0.0,
                min_value: -1.0,
                max_value: 1.0,
                mutation_chance: 0.0,
                replace_chance: 0.0,
                mutation_power: 0.0,
            },
            response: FloatMutationParams {
                init_mean: 1.0,
                init_stdev: 0.0,
                min_value: -1.0,
                max_value: 1.0,
                mutation_chance: 0.0,
                replace_chance: 0.0,
                mutation_power: 0.0,
            },
            time_constant: FloatMutationParams {
                init_mean: 1.0,
                init_stdev: 0.0,
                min_value: 0.1,
                max_value: 4.0,
                mutation_chance: 0.0,
                replace_chance: 0.0,
                mutation_power: 0.0,
            },
            weight: FloatMutationParams {
                init_mean: 0.0,
                init_stdev: 1.0,
                min_value: -8.0,
                max_value: 8.0,
                mutation_chance: 0.0,
                replace_chance: 0.0,
                mutation_power: 0.0,
            },
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
        };
        let innovation = InnovationRegistry::shared(cfg.inputs, cfg.outputs);
        let mut rng = rand::rng();
        let genome = Genome::new_initial(&cfg, innovation, &mut rng);

        let graph = generate_graph(&genome);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
