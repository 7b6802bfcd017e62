//! Per-generation reporting: console summaries plus an accumulated
//! [`StatisticalData`] log. Grounded on `original_source/neat/logging.py`'s
//! per-generation console table, turned into a plain struct the driver
//! owns and threads through explicitly rather than the original's
//! classmethod-only singleton (see the Design Note on process-wide
//! reporters). No logging-framework dependency is introduced: nothing
//! else in the retrieved NEAT/GA corpus reaches for `log`/`tracing` for
//! this kind of summary, so `println!` is the idiom actually in use.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ids::SpeciesId;

/// One generation's summary, the unit `StatisticalData` accumulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f32,
    pub mean_fitness: f32,
    pub stdev_fitness: f32,
    pub species_count: usize,
    pub elapsed_ms: u128,
}

/// The accumulated per-generation history of a run. Serializable so a
/// caller can persist it alongside a checkpoint; this crate does not
/// prescribe the on-disk format (spec.md §6: "format is not part of the
/// core contract").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticalData {
    pub generations: Vec<GenerationStats>,
}

impl StatisticalData {
    pub fn push(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn best_fitness_so_far(&self) -> Option<f32> {
        self.generations.iter().map(|g| g.best_fitness).fold(None, |acc, f| {
            Some(acc.map_or(f, |best: f32| best.max(f)))
        })
    }
}

/// Computes mean and (population) standard deviation of a fitness slice.
fn mean_stdev(fitnesses: &[f32]) -> (f32, f32) {
    if fitnesses.is_empty() {
        return (0.0, 0.0);
    }
    let mean = fitnesses.iter().sum::<f32>() / fitnesses.len() as f32;
    let variance = fitnesses.iter().map(|f| (f - mean).powi(2)).sum::<f32>() / fitnesses.len() as f32;
    (mean, variance.sqrt())
}

/// Prints a one-line-per-generation summary and folds it into `stats`.
/// Mirrors the teacher's orphaned `population.rs`'s `println!("Species
/// amount: {}", ...)` reporting, generalized to the full per-generation
/// summary the original's `Reporter` prints.
#[derive(Debug, Default)]
pub struct Reporter {
    pub stats: StatisticalData,
}

impl Reporter {
    pub fn new() -> Self {
        Reporter { stats: StatisticalData::default() }
    }

    pub fn report_generation(
        &mut self,
        generation: usize,
        fitnesses: &[f32],
        species_count: usize,
        elapsed: Duration,
    ) -> GenerationStats {
        let best_fitness = fitnesses.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let (mean_fitness, stdev_fitness) = mean_stdev(fitnesses);

        let stats = GenerationStats {
            generation,
            best_fitness,
            mean_fitness,
            stdev_fitness,
            species_count,
            elapsed_ms: elapsed.as_millis(),
        };

        println!(
            "Generation {:>4} | best {:>8.4} | mean {:>8.4} | stdev {:>8.4} | species {:>3} | {:>5}ms",
            stats.generation, stats.best_fitness, stats.mean_fitness, stats.stdev_fitness, stats.species_count, stats.elapsed_ms
        );

        self.stats.push(stats.clone());
        stats
    }

    pub fn report_species_table(&self, species: &[(SpeciesId, usize, u32)]) {
        for (id, size, stagnant) in species {
            println!("  species {:>4} | size {:>4} | stagnant {:>3}", id, size, stagnant);
        }
    }
}
