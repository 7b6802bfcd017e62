//! Variable-topology genome: a set of [`NodeGene`]/[`LinkGene`] keyed by
//! their historical IDs, plus the mutation and crossover operators that
//! grow, prune and recombine it. Grounded on `original_source/neat/
//! genomes/genome.py` for the operator semantics and on the teacher's
//! `src/genome/genome.rs` for the Rust shape (a plain struct of
//! `HashMap`s, mutated through `&mut self` methods rather than a
//! graph-library type).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use rand::seq::IteratorRandom;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

use crate::config::{ConnectionScheme, GenomeSection, SpeciationSection};
use crate::gene::{LinkGene, LinkMutationParams, NodeGene, NodeMutationParams, NodeType};
use crate::ids::{GenomeId, LinkId, NodeId, SLink};
use crate::innovation::InnovationRegistry;

#[derive(Debug, Clone)]
pub struct Genome {
    pub id: GenomeId,
    pub fitness: f32,
    pub nodes: HashMap<NodeId, NodeGene>,
    pub links: HashMap<LinkId, LinkGene>,
    pub input_nodes: Vec<NodeId>,
    pub output_nodes: Vec<NodeId>,
    #[allow(dead_code)]
    innovation: Arc<Mutex<InnovationRegistry>>,
}

impl Genome {
    /// Builds one of the initial population's genomes: fixed-ID INPUT and
    /// OUTPUT nodes, connected per `cfg.connection_scheme`, with weights
    /// drawn from `weight.init_mean`/`weight.init_stdev`.
    ///
    /// `hidden_nodes` in [`GenomeSection`] does not affect initial
    /// topology — mirroring the original implementation, where the same
    /// config key is declared but never consulted by default genome
    /// construction; hidden nodes only ever arise through the add-node
    /// mutation.
    pub fn new_initial(
        cfg: &GenomeSection,
        innovation: Arc<Mutex<InnovationRegistry>>,
        rng: &mut dyn RngCore,
    ) -> Self {
        let id = innovation.lock().unwrap().get_genome_id();

        let mut nodes = HashMap::with_capacity(cfg.inputs + cfg.outputs);
        let mut input_nodes = Vec::with_capacity(cfg.inputs);
        let mut output_nodes = Vec::with_capacity(cfg.outputs);

        for i in 0..cfg.inputs {
            let node_id = NodeId(i);
            nodes.insert(
                node_id,
                NodeGene::new(node_id, NodeType::Input, cfg.aggregator.default, cfg.activator.default),
            );
            input_nodes.push(node_id);
        }
        for i in 0..cfg.outputs {
            let node_id = NodeId(cfg.inputs + i);
            nodes.insert(
                node_id,
                NodeGene::new(node_id, NodeType::Output, cfg.aggregator.default, cfg.activator.default),
            );
            output_nodes.push(node_id);
        }

        let mut links = HashMap::new();
        if cfg.connection_scheme == ConnectionScheme::FullyConnected {
            for &i in &input_nodes {
                for &o in &output_nodes {
                    let link_id = innovation.lock().unwrap().get_link_id(i, o);
                    let weight = gauss(rng, cfg.weight.init_mean, cfg.weight.init_stdev);
                    links.insert(link_id, LinkGene::new(link_id, i, o, cfg.weight.clamp(weight)));
                }
            }
        }

        Genome {
            id,
            fitness: 0.0,
            nodes,
            links,
            input_nodes,
            output_nodes,
            innovation,
        }
    }

    /// A fresh, fitness-reset, independently-owned copy: no `HashMap`
    /// entry is shared with `self`, so later mutation of the copy can
    /// never alias back into an elite retained from a previous
    /// generation (see the design note on deep vs shallow copy). Mints
    /// its own new ID from the shared registry.
    pub fn clone_fresh(&self) -> Genome {
        Genome {
            id: self.next_genome_id(),
            fitness: 0.0,
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            input_nodes: self.input_nodes.clone(),
            output_nodes: self.output_nodes.clone(),
            innovation: Arc::clone(&self.innovation),
        }
    }

    pub fn hidden_node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.node_type == NodeType::Hidden)
            .map(|n| n.id)
            .collect()
    }

    pub fn enabled_links(&self) -> impl Iterator<Item = &LinkGene> {
        self.links.values().filter(|l| l.enabled)
    }

    fn next_node_id(&self, split: LinkId) -> NodeId {
        self.innovation.lock().unwrap().get_node_id(split)
    }

    fn next_link_id(&self, in_node: NodeId, out_node: NodeId) -> LinkId {
        self.innovation.lock().unwrap().get_link_id(in_node, out_node)
    }

    fn next_genome_id(&self) -> GenomeId {
        self.innovation.lock().unwrap().get_genome_id()
    }

    // ---- §4.C.2 distance -------------------------------------------------

    pub fn distance(&self, other: &Genome, cfg: &SpeciationSection) -> f32 {
        self.gene_set_distance(
            &self.nodes,
            &other.nodes,
            |a, b| a.distance(b),
            cfg.compatibility_disjoint_coefficient,
        ) + self.gene_set_distance(
            &self.links,
            &other.links,
            |a, b| a.distance(b),
            cfg.compatibility_disjoint_coefficient,
        )
    }

    fn gene_set_distance<K: Eq + std::hash::Hash + Copy, V>(
        &self,
        a: &HashMap<K, V>,
        b: &HashMap<K, V>,
        matched_distance: impl Fn(&V, &V) -> f32,
        disjoint_coefficient: f32,
    ) -> f32 {
        if a.is_empty() && b.is_empty() {
            return 0.0;
        }

        let mut matched_sum = 0.0;
        let mut disjoint = 0;

        for (key, value) in a.iter() {
            match b.get(key) {
                Some(other_value) => matched_sum += matched_distance(value, other_value),
                None => disjoint += 1,
            }
        }
        for key in b.keys() {
            if !a.contains_key(key) {
                disjoint += 1;
            }
        }

        let max_size = a.len().max(b.len()).max(1) as f32;
        matched_sum + disjoint_coefficient * disjoint as f32 / max_size
    }

    // ---- §4.C.3 crossover --------------------------------------------------

    /// Crosses `self` with `other`. The fitter parent is primary: matched
    /// genes are combined per-attribute 50/50, disjoint/excess genes are
    /// copied from the primary parent only. Genes present solely in the
    /// secondary parent are not inherited.
    pub fn crossover(&self, other: &Genome, rng: &mut dyn RngCore) -> Genome {
        let (primary, secondary) = if self.fitness >= other.fitness {
            (self, other)
        } else {
            (other, self)
        };

        let mut nodes = HashMap::with_capacity(primary.nodes.len());
        for (id, gene) in &primary.nodes {
            let child_gene = match secondary.nodes.get(id) {
                Some(other_gene) => gene.crossover(other_gene, rng),
                None => gene.clone(),
            };
            nodes.insert(*id, child_gene);
        }

        let mut links = HashMap::with_capacity(primary.links.len());
        for (id, gene) in &primary.links {
            let child_gene = match secondary.links.get(id) {
                Some(other_gene) => gene.crossover(other_gene, rng),
                None => gene.clone(),
            };
            links.insert(*id, child_gene);
        }

        Genome {
            id: self.next_genome_id(),
            fitness: 0.0,
            nodes,
            links,
            input_nodes: primary.input_nodes.clone(),
            output_nodes: primary.output_nodes.clone(),
            innovation: Arc::clone(&self.innovation),
        }
    }

    // ---- §4.C.4 structural + attribute mutation ---------------------------

    pub fn mutate(&mut self, cfg: &GenomeSection, rng: &mut dyn RngCore) {
        if rng.random::<f32>() < cfg.node_addition_chance {
            self.mutate_add_node(cfg, rng);
        }
        if rng.random::<f32>() < cfg.node_deletion_chance {
            self.mutate_delete_node(rng);
        }
        if rng.random::<f32>() < cfg.link_addition_chance {
            self.mutate_add_link(cfg, rng);
        }
        if rng.random::<f32>() < cfg.link_deletion_chance {
            self.mutate_delete_link(rng);
        }
        if rng.random::<f32>() < cfg.link_toggle_chance {
            self.mutate_toggle_enable(rng);
        }

        let node_params = NodeMutationParams {
            bias: &cfg.bias,
            response: &cfg.response,
            time_constant: &cfg.time_constant,
            aggregator: &cfg.aggregator,
            activator: &cfg.activator,
        };
        for node in self.nodes.values_mut() {
            node.mutate(&node_params, rng);
        }

        let link_params = LinkMutationParams {
            weight: &cfg.weight,
            enabled: &cfg.enabled,
            frozen: &cfg.frozen,
        };
        for link in self.links.values_mut() {
            link.mutate(&link_params, rng);
        }
    }

    fn mutate_add_node(&mut self, cfg: &GenomeSection, rng: &mut dyn RngCore) {
        let Some(split_id) = self
            .links
            .values()
            .filter(|l| l.enabled)
            .map(|l| l.id)
            .choose(rng)
        else {
            return;
        };

        let (in_node, out_node, weight) = {
            let link = self.links.get_mut(&split_id).unwrap();
            link.enabled = false;
            (link.in_node, link.out_node, link.weight)
        };

        let new_node_id = self.next_node_id(split_id);
        self.nodes.entry(new_node_id).or_insert_with(|| {
            NodeGene::new(new_node_id, NodeType::Hidden, cfg.aggregator.default, cfg.activator.default)
        });

        let first_id = self.next_link_id(in_node, new_node_id);
        self.links
            .entry(first_id)
            .or_insert_with(|| LinkGene::new(first_id, in_node, new_node_id, 1.0));

        let second_id = self.next_link_id(new_node_id, out_node);
        self.links
            .entry(second_id)
            .or_insert_with(|| LinkGene::new(second_id, new_node_id, out_node, weight));
    }

    fn mutate_delete_node(&mut self, rng: &mut dyn RngCore) {
        let Some(node_id) = self.hidden_node_ids().into_iter().choose(rng) else {
            return;
        };

        self.links.retain(|_, l| l.in_node != node_id && l.out_node != node_id);
        self.nodes.remove(&node_id);
    }

    fn mutate_add_link(&mut self, cfg: &GenomeSection, rng: &mut dyn RngCore) {
        let Some(&in_node) = self
            .nodes
            .values()
            .filter(|n| n.node_type != NodeType::Output)
            .map(|n| &n.id)
            .choose(rng)
        else {
            return;
        };
        let Some(&out_node) = self
            .nodes
            .values()
            .filter(|n| n.node_type != NodeType::Input)
            .map(|n| &n.id)
            .choose(rng)
        else {
            return;
        };

        if in_node == out_node {
            return;
        }

        if self.links.values().any(|l| l.simple_link() == (in_node, out_node)) {
            return;
        }

        if cfg.feed_forward {
            let existing: Vec<SLink> = self.enabled_links().map(|l| l.simple_link()).collect();
            if creates_cycle(&existing, (in_node, out_node)) {
                return;
            }
        }

        let link_id = self.next_link_id(in_node, out_node);
        if self.links.contains_key(&link_id) {
            return;
        }

        let weight = gauss(rng, cfg.weight.init_mean, cfg.weight.init_stdev);
        self.links
            .insert(link_id, LinkGene::new(link_id, in_node, out_node, cfg.weight.clamp(weight)));
    }

    fn mutate_delete_link(&mut self, rng: &mut dyn RngCore) {
        let Some(link_id) = self.links.keys().copied().choose(rng) else {
            return;
        };
        self.links.remove(&link_id);
    }

    fn mutate_toggle_enable(&mut self, rng: &mut dyn RngCore) {
        let Some(link_id) = self.links.keys().copied().choose(rng) else {
            return;
        };

        if !self.links[&link_id].enabled {
            self.links.get_mut(&link_id).unwrap().enabled = true;
            return;
        }

        let in_node = self.links[&link_id].in_node;
        let sources_from_in_node = self.links.values().filter(|l| l.in_node == in_node).count();
        if sources_from_in_node >= 2 {
            self.links.get_mut(&link_id).unwrap().enabled = false;
        }
    }
}

/// Returns `true` if adding `(i, o)` to `links` would close a cycle.
/// Internal cycle-check probe (spec's `CycleDetected`, surfaced only in
/// tests) — the add-link mutation just swallows a `true` result as a
/// no-op rather than propagating an error.
pub fn creates_cycle(links: &[SLink], (i, o): SLink) -> bool {
    if i == o {
        return true;
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    visited.insert(o);

    loop {
        let mut added = 0;
        for &(a, b) in links {
            if visited.contains(&a) && !visited.contains(&b) {
                if b == i {
                    return true;
                }
                visited.insert(b);
                added += 1;
            }
        }
        if added == 0 {
            return false;
        }
    }
}

fn gauss(rng: &mut dyn RngCore, mean: f32, stdev: f32) -> f32 {
    if stdev <= 0.0 {
        return mean;
    }
    Normal::new(mean, stdev).unwrap().sample(rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_probe_matches_spec_scenario() {
        let links = vec![
            (NodeId(0), NodeId(2)),
            (NodeId(2), NodeId(3)),
            (NodeId(3), NodeId(2)),
        ];
        assert!(!creates_cycle(&links, (NodeId(1), NodeId(0))));
        assert!(creates_cycle(&links, (NodeId(2), NodeId(0))) || creates_cycle(&links, (NodeId(3), NodeId(0))));
    }

    #[test]
    fn self_loop_is_always_a_cycle() {
        assert!(creates_cycle(&[], (NodeId(5), NodeId(5))));
    }

    #[test]
    fn empty_link_set_has_no_cycle() {
        assert!(!creates_cycle(&[], (NodeId(0), NodeId(1))));
    }
}
