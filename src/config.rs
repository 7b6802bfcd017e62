//! Typed configuration surface consumed by the gene, genome, speciation and
//! reproduction modules. Grounded on `examples/SilvanCodes-novel-set-neat/
//! src/parameters.rs` for the `config`-crate loading pattern, and on
//! `original_source/neat/parameters.py` for the section/key layout this
//! crate's INI files use.

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::activation::Activator;
use crate::aggregation::Aggregator;
use crate::error::{NeatError, Result};

/// Mutation parameters shared by every float-valued mutable attribute
/// (`bias`, `response`, `weight`). One instance per attribute, loaded from
/// the `{attr}_init_mean`, `{attr}_init_stdev`, ... keys of a config
/// section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FloatMutationParams {
    pub init_mean: f32,
    pub init_stdev: f32,
    pub min_value: f32,
    pub max_value: f32,
    pub mutation_chance: f32,
    pub replace_chance: f32,
    pub mutation_power: f32,
}

impl FloatMutationParams {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// Mutation parameters for a boolean mutable attribute (`enabled`, `frozen`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoolMutationParams {
    pub mutation_chance: f32,
}

/// Mutation parameters for an enum-valued mutable attribute (`activator`,
/// `aggregator`): a mutation chance plus the pool of values to choose from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnumMutationParams<T> {
    pub mutation_chance: f32,
    pub options: Vec<T>,
    pub default: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionScheme {
    FullyConnected,
    Unconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessCriterion {
    Max,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NeatSection {
    pub reset_on_extinction: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenomeSection {
    pub inputs: usize,
    pub outputs: usize,
    pub hidden_nodes: usize,
    pub feed_forward: bool,
    pub connection_scheme: ConnectionScheme,

    pub node_addition_chance: f32,
    pub node_deletion_chance: f32,
    pub link_addition_chance: f32,
    pub link_deletion_chance: f32,
    pub link_toggle_chance: f32,

    pub bias: FloatMutationParams,
    pub response: FloatMutationParams,
    pub time_constant: FloatMutationParams,
    pub weight: FloatMutationParams,
    pub activator: EnumMutationParams<Activator>,
    pub aggregator: EnumMutationParams<Aggregator>,
    pub enabled: BoolMutationParams,
    pub frozen: BoolMutationParams,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciationSection {
    pub compatibility_disjoint_coefficient: f32,
    pub compatibility_weight_coefficient: f32,
    pub compatibility_threshold: f32,
    pub max_stagnation: i32,
    pub survival_rate: f32,
    pub elitism: usize,
    pub min_species_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationSection {
    pub fitness_threshold: f32,
    pub fitness_criterion: FitnessCriterion,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReproductionSection {
    pub crossover_rate: f32,
    pub inter_species_crossover_rate: f32,
    pub max_stagnation: i32,
    pub survival_rate: f32,
    pub elitism: usize,
    pub elitism_threshold: usize,
    pub min_species_size: usize,
    pub population: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Parameters {
    pub neat: NeatSection,
    pub genome: GenomeSection,
    pub speciation: SpeciationSection,
    pub evaluation: EvaluationSection,
    pub reproduction: ReproductionSection,
}

impl Parameters {
    /// Loads an INI-like config file. Keys are case-insensitive and
    /// reduced to snake_case by the underlying `config` crate. Unknown or
    /// missing keys are rejected with [`NeatError::Config`].
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::new(path, FileFormat::Ini))
            .build()
            .map_err(|e| NeatError::Config {
                section: "<file>".into(),
                key: e.to_string(),
            })?;

        Ok(Parameters {
            neat: Self::section(&settings, "neat")?,
            genome: Self::section(&settings, "genome")?,
            speciation: Self::section(&settings, "speciation")?,
            evaluation: Self::section(&settings, "evaluation")?,
            reproduction: Self::section(&settings, "reproduction")?,
        })
    }

    fn section<'de, T: Deserialize<'de>>(settings: &Config, name: &str) -> Result<T> {
        settings
            .get::<T>(name)
            .map_err(|e| NeatError::Config {
                section: name.into(),
                key: e.to_string(),
            })
    }
}
