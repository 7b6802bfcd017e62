//! Process-global historical marking registry.
//!
//! Two genomes that independently perform the "same" structural mutation
//! (splitting the same link, or adding a link between the same pair of
//! nodes) must receive identical IDs for the new gene — that's what makes
//! crossover between differently-shaped genomes meaningful. This registry
//! is the single owner of that bookkeeping; genomes hold a shared handle
//! to it rather than each keeping a private copy (see the crate's design
//! notes on historical markers as shared state).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::ids::{GenomeId, LinkId, NodeId, SLink, SpeciesId};

#[derive(Debug)]
pub struct InnovationRegistry {
    node_counter: usize,
    node_record: HashMap<LinkId, NodeId>,
    link_counter: usize,
    link_record: HashMap<SLink, LinkId>,
    species_counter: usize,
    genome_counter: usize,
}

impl InnovationRegistry {
    /// `node_counter` starts past the reserved input/output node IDs
    /// (`0..inputs+outputs`), as spec'd in the Innovation Registry's
    /// initial state.
    pub fn new(inputs: usize, outputs: usize) -> Self {
        InnovationRegistry {
            node_counter: inputs + outputs,
            node_record: HashMap::new(),
            link_counter: 0,
            link_record: HashMap::new(),
            species_counter: 0,
            genome_counter: 0,
        }
    }

    pub fn shared(inputs: usize, outputs: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new(inputs, outputs)))
    }

    /// Returns the (possibly newly-allocated) node ID for splitting `split`.
    pub fn get_node_id(&mut self, split: LinkId) -> NodeId {
        if let Some(&id) = self.node_record.get(&split) {
            return id;
        }

        let id = NodeId(self.node_counter);
        self.node_counter += 1;
        self.node_record.insert(split, id);
        id
    }

    /// Returns the (possibly newly-allocated) link ID for `(in_node, out_node)`.
    pub fn get_link_id(&mut self, in_node: NodeId, out_node: NodeId) -> LinkId {
        let key = (in_node, out_node);
        if let Some(&id) = self.link_record.get(&key) {
            return id;
        }

        let id = LinkId(self.link_counter);
        self.link_counter += 1;
        self.link_record.insert(key, id);
        id
    }

    pub fn get_species_id(&mut self) -> SpeciesId {
        let id = SpeciesId(self.species_counter);
        self.species_counter += 1;
        id
    }

    pub fn get_genome_id(&mut self) -> GenomeId {
        let id = GenomeId(self.genome_counter);
        self.genome_counter += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_split_returns_same_node_id() {
        let mut reg = InnovationRegistry::new(2, 1);
        let a = reg.get_node_id(LinkId(0));
        let b = reg.get_node_id(LinkId(0));
        assert_eq!(a, b);
    }

    #[test]
    fn different_splits_return_different_node_ids() {
        let mut reg = InnovationRegistry::new(2, 1);
        let a = reg.get_node_id(LinkId(0));
        let b = reg.get_node_id(LinkId(1));
        assert_ne!(a, b);
    }

    #[test]
    fn same_link_pair_returns_same_link_id() {
        let mut reg = InnovationRegistry::new(2, 1);
        let a = reg.get_link_id(NodeId(0), NodeId(2));
        let b = reg.get_link_id(NodeId(0), NodeId(2));
        assert_eq!(a, b);
    }

    #[test]
    fn node_counter_starts_after_io_nodes() {
        let mut reg = InnovationRegistry::new(3, 2);
        let id = reg.get_node_id(LinkId(0));
        assert_eq!(id, NodeId(5));
    }

    #[test]
    fn species_and_genome_ids_are_monotonic() {
        let mut reg = InnovationRegistry::new(2, 1);
        assert_eq!(reg.get_species_id(), SpeciesId(0));
        assert_eq!(reg.get_species_id(), SpeciesId(1));
        assert_eq!(reg.get_genome_id(), GenomeId(0));
        assert_eq!(reg.get_genome_id(), GenomeId(1));
    }
}
