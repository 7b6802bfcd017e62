//! Turns a speciated, fitness-assigned generation into the next one:
//! stagnation filtering, adjusted-fitness-proportional offspring
//! allocation, truncation selection, elitism and mating. Grounded on
//! `original_source/neat/reproduction.py`, function-for-function —
//! `filter_stagnant_species` → [`filter_stagnant`], `reproduce` →
//! [`reproduce`], `compute_offspring_per_species` →
//! [`offspring_per_species`].

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::config::{GenomeSection, ReproductionSection};
use crate::error::{NeatError, Result};
use crate::genome::Genome;
use crate::species::Species;

/// Drops every species whose stagnation counter exceeds
/// `max_stagnation`. An all-stagnant generation is the population's
/// extinction event — the caller decides whether to reset.
pub fn filter_stagnant(species: Vec<Species>, cfg: &ReproductionSection) -> Result<Vec<Species>> {
    let remaining: Vec<Species> = species
        .into_iter()
        .filter(|s| s.info.stagnant <= cfg.max_stagnation as u32)
        .collect();

    if remaining.is_empty() {
        return Err(NeatError::Extinction);
    }
    Ok(remaining)
}

/// `ceil(population * adjusted_k / sum)`, floored at `min_species_size`,
/// then rescaled so the allocation sums close to `population`. Matches
/// the original's tolerance exactly rather than tightening it: the
/// rescale-then-round-then-refloor sequence can land the total a few
/// genomes off `population`, and that's by design, not a bug to fix.
fn offspring_per_species(species: &[Species], adjusted: &[f32], cfg: &ReproductionSection) -> Vec<usize> {
    let sum: f32 = adjusted.iter().sum();

    let mut counts: Vec<usize> = if sum != 0.0 {
        adjusted
            .iter()
            .map(|f| {
                let normalized = f / sum;
                let spawn = (cfg.population as f32 * normalized).ceil() as usize;
                spawn.max(cfg.min_species_size)
            })
            .collect()
    } else {
        let even = (cfg.population as f32 / species.len().max(1) as f32).ceil() as usize;
        vec![even; species.len()]
    };

    let total: usize = counts.iter().sum();
    if total > 0 {
        let norm = cfg.population as f32 / total as f32;
        counts = counts
            .iter()
            .map(|&n| ((n as f32 * norm).round() as usize).max(cfg.min_species_size))
            .collect();
    }
    counts
}

/// Produces the next generation's flat genome list.
pub fn reproduce(
    mut species: Vec<Species>,
    cfg: &ReproductionSection,
    genome_cfg: &GenomeSection,
    rng: &mut dyn RngCore,
) -> Vec<Genome> {
    let all_fitness: Vec<f32> = species.iter().flat_map(|s| s.members.iter().map(|g| g.fitness)).collect();
    let min_fitness = all_fitness.iter().copied().fold(f32::INFINITY, f32::min);
    let max_fitness = all_fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = (max_fitness - min_fitness).max(1.0);

    let adjusted: Vec<f32> = species
        .iter_mut()
        .map(|s| {
            let fitness = (s.mean_fitness() - min_fitness) / range;
            s.info.record_fitness(fitness);
            fitness
        })
        .collect();

    let allocation = offspring_per_species(&species, &adjusted, cfg);

    for s in species.iter_mut() {
        s.sort_by_fitness();
        s.truncate_to_survivors(cfg.survival_rate.max(cfg.min_species_size as f32 / s.size().max(1) as f32));
    }

    let mut offspring = Vec::with_capacity(cfg.population);
    for (i, target) in allocation.into_iter().enumerate() {
        let mut remaining = target;

        if species[i].size() >= cfg.elitism_threshold {
            let elites = species[i].elites(cfg.elitism);
            remaining = remaining.saturating_sub(elites.len());
            offspring.extend(elites);
        }

        for _ in 0..remaining {
            let Some(parent1) = species[i].random_member(rng).cloned() else {
                continue;
            };

            let mut child = if rng.random::<f32>() < cfg.crossover_rate {
                let parent2 = if rng.random::<f32>() < cfg.inter_species_crossover_rate {
                    let other_indices: Vec<usize> = (0..species.len()).filter(|&j| j != i).collect();
                    match other_indices.choose(rng) {
                        Some(&j) => species[j].random_member(rng).cloned(),
                        None => species[i].random_member(rng).cloned(),
                    }
                } else {
                    species[i].random_member(rng).cloned()
                };
                match parent2 {
                    Some(parent2) => parent1.crossover(&parent2, rng),
                    None => parent1.clone_fresh(),
                }
            } else {
                parent1.clone_fresh()
            };

            // §4.F.6: the child passes through mutation once before joining
            // the next generation; elites above (copied unchanged) never do.
            child.mutate(genome_cfg, rng);
            offspring.push(child);
        }
    }

    offspring
}
