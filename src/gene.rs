//! Node and Link genes: the two concrete gene kinds that make up a
//! [`crate::genome::Genome`]. Both share the same `distance` / `crossover`
//! / `mutate` shape (per the design note on "polymorphism over gene
//! kinds") without a shared trait object — the fields differ enough, and
//! the call sites are always statically typed, that a trait would only
//! add indirection.
//!
//! Per-attribute mutation is driven by the generic `mutate_float` /
//! `mutate_bool` / `mutate_enum` helpers below, each taking a field and its
//! [`crate::config`] parameters — the enumeration the design notes call for
//! is the explicit sequence of calls in [`NodeGene::mutate`] /
//! [`LinkGene::mutate`], not a runtime reflection loop.

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::activation::Activator;
use crate::aggregation::Aggregator;
use crate::config::{BoolMutationParams, EnumMutationParams, FloatMutationParams};
use crate::ids::{LinkId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Input,
    Hidden,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGene {
    pub id: NodeId,
    pub node_type: NodeType,
    pub bias: f32,
    pub response: f32,
    pub aggregator: Aggregator,
    pub activator: Activator,
    /// Only consulted by [`crate::network::CtrnnNetwork`]; feed-forward
    /// networks ignore it. Not part of spec.md's original node-gene
    /// attribute list — carried in from the teacher's CTRNN phenotype.
    pub time_constant: f32,
}

impl NodeGene {
    pub fn new(id: NodeId, node_type: NodeType, aggregator: Aggregator, activator: Activator) -> Self {
        NodeGene {
            id,
            node_type,
            bias: 0.0,
            response: 1.0,
            aggregator,
            activator,
            time_constant: 1.0,
        }
    }

    /// `INPUT`/`OUTPUT` nodes only aggregate their incoming values; `HIDDEN`
    /// nodes additionally scale by `response`, add `bias`, then activate.
    pub fn evaluate(&self, inputs: &[f32]) -> f32 {
        let aggregated = self.aggregator.aggregate(inputs);
        match self.node_type {
            NodeType::Input | NodeType::Output => aggregated,
            NodeType::Hidden => self.activator.activate(aggregated * self.response + self.bias),
        }
    }

    pub fn distance(&self, other: &NodeGene) -> f32 {
        let mut d = (self.bias - other.bias).abs() + (self.response - other.response).abs();
        if self.activator != other.activator {
            d += 1.0;
        }
        if self.aggregator != other.aggregator {
            d += 1.0;
        }
        d
    }

    /// Per-attribute 50/50 choice between `self` and `other`. Callers must
    /// only invoke this on matched genes (same `id`).
    pub fn crossover(&self, other: &NodeGene, rng: &mut dyn RngCore) -> NodeGene {
        NodeGene {
            id: self.id,
            node_type: self.node_type,
            bias: pick(rng, self.bias, other.bias),
            response: pick(rng, self.response, other.response),
            aggregator: pick(rng, self.aggregator, other.aggregator),
            activator: pick(rng, self.activator, other.activator),
            time_constant: pick(rng, self.time_constant, other.time_constant),
        }
    }

    pub fn mutate(&mut self, cfg: &NodeMutationParams, rng: &mut dyn RngCore) {
        if self.node_type != NodeType::Hidden {
            // INPUT/OUTPUT nodes never apply bias/response/activator, so
            // jittering them would be wasted and observably pointless.
            return;
        }
        mutate_float(&mut self.bias, &cfg.bias, rng);
        mutate_float(&mut self.response, &cfg.response, rng);
        mutate_float(&mut self.time_constant, &cfg.time_constant, rng);
        mutate_enum(&mut self.aggregator, &cfg.aggregator, rng);
        mutate_enum(&mut self.activator, &cfg.activator, rng);
    }
}

pub struct NodeMutationParams<'a> {
    pub bias: &'a FloatMutationParams,
    pub response: &'a FloatMutationParams,
    pub time_constant: &'a FloatMutationParams,
    pub aggregator: &'a EnumMutationParams<Aggregator>,
    pub activator: &'a EnumMutationParams<Activator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkGene {
    pub id: LinkId,
    pub in_node: NodeId,
    pub out_node: NodeId,
    pub weight: f32,
    pub enabled: bool,
    pub frozen: bool,
}

impl LinkGene {
    pub fn new(id: LinkId, in_node: NodeId, out_node: NodeId, weight: f32) -> Self {
        LinkGene {
            id,
            in_node,
            out_node,
            weight,
            enabled: true,
            frozen: false,
        }
    }

    pub fn simple_link(&self) -> (NodeId, NodeId) {
        (self.in_node, self.out_node)
    }

    pub fn distance(&self, other: &LinkGene) -> f32 {
        let mut d = (self.weight - other.weight).abs();
        if self.enabled != other.enabled {
            d += 1.0;
        }
        if self.frozen != other.frozen {
            d += 1.0;
        }
        d
    }

    pub fn crossover(&self, other: &LinkGene, rng: &mut dyn RngCore) -> LinkGene {
        LinkGene {
            id: self.id,
            in_node: self.in_node,
            out_node: self.out_node,
            weight: pick(rng, self.weight, other.weight),
            enabled: pick(rng, self.enabled, other.enabled),
            frozen: pick(rng, self.frozen, other.frozen),
        }
    }

    pub fn mutate(&mut self, cfg: &LinkMutationParams, rng: &mut dyn RngCore) {
        mutate_float(&mut self.weight, cfg.weight, rng);
        mutate_bool(&mut self.enabled, cfg.enabled, rng);
        mutate_bool(&mut self.frozen, cfg.frozen, rng);
    }
}

pub struct LinkMutationParams<'a> {
    pub weight: &'a FloatMutationParams,
    pub enabled: &'a BoolMutationParams,
    pub frozen: &'a BoolMutationParams,
}

fn pick<T: Copy>(rng: &mut dyn RngCore, a: T, b: T) -> T {
    if rng.random_bool(0.5) {
        a
    } else {
        b
    }
}

fn mutate_float(value: &mut f32, params: &FloatMutationParams, rng: &mut dyn RngCore) {
    if rng.random::<f32>() >= params.mutation_chance {
        return;
    }

    let proposed = if rng.random::<f32>() < params.replace_chance {
        gauss(rng, params.init_mean, params.init_stdev)
    } else {
        *value + gauss(rng, 0.0, params.mutation_power)
    };

    *value = params.clamp(proposed);
}

fn mutate_bool(value: &mut bool, params: &BoolMutationParams, rng: &mut dyn RngCore) {
    if rng.random::<f32>() < params.mutation_chance {
        *value = !*value;
    }
}

fn mutate_enum<T: Copy>(value: &mut T, params: &EnumMutationParams<T>, rng: &mut dyn RngCore) {
    if rng.random::<f32>() < params.mutation_chance && !params.options.is_empty() {
        let idx = rng.random_range(0..params.options.len());
        *value = params.options[idx];
    }
}

fn gauss(rng: &mut dyn RngCore, mean: f32, stdev: f32) -> f32 {
    if stdev <= 0.0 {
        return mean;
    }
    Normal::new(mean, stdev).unwrap().sample(rng)
}
