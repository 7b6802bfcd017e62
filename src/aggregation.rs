//! Node aggregation kernels: pure `&[f32] -> f32` reductions over a node's
//! incoming weighted inputs. Grounded on `neat/aggregations.py` in the
//! original implementation this crate was distilled from.

use rand::seq::IndexedRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    Max,
    Min,
    MaxAbs,
    Mean,
    Sum,
    Product,
    Median,
}

impl Aggregator {
    pub const ALL: [Aggregator; 7] = [
        Aggregator::Max,
        Aggregator::Min,
        Aggregator::MaxAbs,
        Aggregator::Mean,
        Aggregator::Sum,
        Aggregator::Product,
        Aggregator::Median,
    ];

    pub fn aggregate(&self, values: &[f32]) -> f32 {
        if values.is_empty() {
            return 0.0;
        }

        match self {
            Aggregator::Max => values.iter().cloned().fold(f32::MIN, f32::max),
            Aggregator::Min => values.iter().cloned().fold(f32::MAX, f32::min),
            Aggregator::MaxAbs => values
                .iter()
                .cloned()
                .fold(0.0, |acc, v| if v.abs() > acc.abs() { v } else { acc }),
            Aggregator::Mean => values.iter().sum::<f32>() / values.len() as f32,
            Aggregator::Sum => values.iter().sum(),
            Aggregator::Product => values.iter().product(),
            Aggregator::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
        }
    }

    pub fn random(rng: &mut dyn RngCore, options: &[Aggregator]) -> Aggregator {
        *options.choose(rng).unwrap_or(&Aggregator::Sum)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator::Sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_adds_all() {
        assert_eq!(Aggregator::Sum.aggregate(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn max_picks_largest() {
        assert_eq!(Aggregator::Max.aggregate(&[1.0, 5.0, 3.0]), 5.0);
    }

    #[test]
    fn maxabs_keeps_sign() {
        assert_eq!(Aggregator::MaxAbs.aggregate(&[1.0, -5.0, 3.0]), -5.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(Aggregator::Median.aggregate(&[1.0, 3.0, 2.0]), 2.0);
        assert_eq!(Aggregator::Median.aggregate(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(Aggregator::Sum.aggregate(&[]), 0.0);
    }
}
