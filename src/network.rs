//! Phenotype construction: turning a [`crate::genome::Genome`] into
//! something that can be repeatedly `activate`d. Grounded on the
//! teacher's `src/nn/nn.rs` for the `NeuralNetwork` trait shape (borrow
//! the genome, build once, activate many times) and on `original_source/
//! neat/networks/{utils,feed_forward}.py` for the required-node /
//! feed-forward-layering algorithm that the feed-forward builder uses to
//! decide evaluation order.

use std::collections::{HashMap, HashSet};

use crate::gene::NodeType;
use crate::genome::Genome;
use crate::ids::{NodeId, SLink};

#[derive(thiserror::Error, miette::Diagnostic, Debug)]
pub enum NetworkError {
    #[error("expected {expected} inputs, got {actual}")]
    InvalidInput { expected: usize, actual: usize },
}

pub enum NetworkType {
    FeedForward,
    Ctrnn,
}

pub trait NeuralNetwork<'g> {
    fn from_genome(genome: &'g Genome) -> Self
    where
        Self: Sized;

    fn activate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError>;
}

/// Nodes whose output is eventually read by an output node, computed by
/// repeatedly expanding the frontier backwards from the outputs.
/// Direct port of `required_for_output`.
fn required_for_output(inputs: &[NodeId], outputs: &[NodeId], links: &[SLink]) -> HashSet<NodeId> {
    let input_set: HashSet<NodeId> = inputs.iter().copied().collect();

    let mut required: HashSet<NodeId> = outputs.iter().copied().collect();
    let mut frontier: HashSet<NodeId> = outputs.iter().copied().collect();

    loop {
        let candidates: HashSet<NodeId> = links
            .iter()
            .filter(|(a, b)| frontier.contains(b) && !frontier.contains(a))
            .map(|(a, _)| *a)
            .collect();

        let layer_nodes: HashSet<NodeId> = candidates.difference(&input_set).copied().collect();
        if layer_nodes.is_empty() {
            break;
        }

        required.extend(&layer_nodes);
        frontier.extend(&candidates);
    }

    required
}

/// Groups the nodes required for output into layers evaluable in order:
/// each layer's members depend only on nodes in earlier layers (or the
/// inputs). Direct port of `get_feed_forward_layers`.
fn feed_forward_layers(inputs: &[NodeId], outputs: &[NodeId], links: &[SLink]) -> Vec<Vec<NodeId>> {
    let required = required_for_output(inputs, outputs, links);

    let mut layers = Vec::new();
    let mut evaluated: HashSet<NodeId> = inputs.iter().copied().collect();

    loop {
        let candidates: HashSet<NodeId> = links
            .iter()
            .filter(|(a, b)| evaluated.contains(a) && !evaluated.contains(b))
            .map(|(_, b)| *b)
            .collect();

        let mut layer: Vec<NodeId> = candidates
            .into_iter()
            .filter(|n| required.contains(n) && links.iter().filter(|(_, b)| b == n).all(|(a, _)| evaluated.contains(a)))
            .collect();

        if layer.is_empty() {
            break;
        }

        layer.sort_by_key(|n| n.0);
        evaluated.extend(layer.iter().copied());
        layers.push(layer);
    }

    layers
}

struct NodeEval {
    node: NodeId,
    incoming: Vec<(NodeId, f32)>,
}

/// Static-topology feed-forward phenotype: an evaluation order computed
/// once at construction time from [`feed_forward_layers`], then replayed
/// on every `activate` call.
pub struct FeedforwardNetwork<'g> {
    genome: &'g Genome,
    evals: Vec<NodeEval>,
}

impl<'g> NeuralNetwork<'g> for FeedforwardNetwork<'g> {
    fn from_genome(genome: &'g Genome) -> Self {
        let links: Vec<SLink> = genome.enabled_links().map(|l| l.simple_link()).collect();
        let layers = feed_forward_layers(&genome.input_nodes, &genome.output_nodes, &links);

        let mut evals = Vec::new();
        for layer in layers {
            for node in layer {
                let incoming = genome
                    .enabled_links()
                    .filter(|l| l.out_node == node)
                    .map(|l| (l.in_node, l.weight))
                    .collect();
                evals.push(NodeEval { node, incoming });
            }
        }

        FeedforwardNetwork { genome, evals }
    }

    fn activate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.genome.input_nodes.len() {
            return Err(NetworkError::InvalidInput {
                expected: self.genome.input_nodes.len(),
                actual: inputs.len(),
            });
        }

        let mut values: HashMap<NodeId, f32> = HashMap::with_capacity(self.genome.nodes.len());
        for (&node, &value) in self.genome.input_nodes.iter().zip(inputs.iter()) {
            values.insert(node, value);
        }

        for eval in &self.evals {
            let weighted: Vec<f32> = eval
                .incoming
                .iter()
                .map(|(src, weight)| values.get(src).copied().unwrap_or(0.0) * weight)
                .collect();
            let output = self.genome.nodes[&eval.node].evaluate(&weighted);
            values.insert(eval.node, output);
        }

        Ok(self
            .genome
            .output_nodes
            .iter()
            .map(|n| values.get(n).copied().unwrap_or(0.0))
            .collect())
    }
}

/// Continuous-time recurrent phenotype: every enabled link contributes on
/// every step regardless of topological order, so cycles are not just
/// tolerated but the whole point. Grounded on the teacher's
/// `src/nn/ctrnn.rs` (per-node time constant, Euler-integrated state,
/// sigmoid readout of both hidden states and outputs).
pub struct CtrnnNetwork<'g> {
    genome: &'g Genome,
    states: HashMap<NodeId, f32>,
    dt: f32,
}

impl<'g> CtrnnNetwork<'g> {
    pub fn with_time_step(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn reset_states(&mut self) {
        for value in self.states.values_mut() {
            *value = 0.0;
        }
    }
}

impl<'g> NeuralNetwork<'g> for CtrnnNetwork<'g> {
    fn from_genome(genome: &'g Genome) -> Self {
        let states = genome.nodes.keys().map(|&id| (id, 0.0)).collect();
        CtrnnNetwork { genome, states, dt: 0.1 }
    }

    fn activate(&mut self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.genome.input_nodes.len() {
            return Err(NetworkError::InvalidInput {
                expected: self.genome.input_nodes.len(),
                actual: inputs.len(),
            });
        }

        for (&node, &value) in self.genome.input_nodes.iter().zip(inputs.iter()) {
            self.states.insert(node, value);
        }

        let mut next_states = self.states.clone();
        for (&id, node) in &self.genome.nodes {
            if self.genome.input_nodes.contains(&id) {
                continue;
            }

            let mut weighted_input = node.bias;
            for link in self.genome.enabled_links().filter(|l| l.out_node == id) {
                let source_state = self.states.get(&link.in_node).copied().unwrap_or(0.0);
                weighted_input += sigmoid(source_state) * link.weight;
            }

            let tau = node.time_constant.max(f32::EPSILON);
            let current = self.states.get(&id).copied().unwrap_or(0.0);
            let dy_dt = (-current + weighted_input) / tau;
            next_states.insert(id, current + dy_dt * self.dt);
        }
        self.states = next_states;

        Ok(self
            .genome
            .output_nodes
            .iter()
            .map(|n| sigmoid(self.states.get(n).copied().unwrap_or(0.0)))
            .collect())
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
