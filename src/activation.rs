//! Node activation kernels: pure `f32 -> f32` functions with no side effects.

use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activator {
    Identity,
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
    Gaussian,
    Sine,
    Step,
    Abs,
}

impl Activator {
    pub const ALL: [Activator; 9] = [
        Activator::Identity,
        Activator::Sigmoid,
        Activator::Tanh,
        Activator::Relu,
        Activator::LeakyRelu,
        Activator::Gaussian,
        Activator::Sine,
        Activator::Step,
        Activator::Abs,
    ];

    pub fn activate(&self, x: f32) -> f32 {
        match self {
            Activator::Identity => x,
            Activator::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activator::Tanh => x.tanh(),
            Activator::Relu => x.max(0.0),
            Activator::LeakyRelu => x.max(0.01 * x),
            Activator::Gaussian => (-x * x).exp(),
            Activator::Sine => x.sin(),
            Activator::Step => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activator::Abs => x.abs(),
        }
    }

    pub fn random(rng: &mut dyn RngCore, options: &[Activator]) -> Activator {
        *options.choose(rng).unwrap_or(&Activator::Identity)
    }
}

impl Default for Activator {
    fn default() -> Self {
        Activator::Sigmoid
    }
}
