use crate::distribution::{DistributionAnalysis, OptimalDistribution};
use crate::influence::InfluenceRecord;

const BASE_SCORE: f64 = 85.0;
const SUM_WEIGHT: f64 = 25.0;
const SPREAD_WEIGHT: f64 = 20.0;
const PARITY_WEIGHT: f64 = 15.0;
const RUN_PENALTY: f64 = 10.0;
const INFLUENCE_WEIGHT: f64 = 15.0;

/// Pénalité saturante : croît avec l'écart mais ne dépasse jamais `weight`.
fn saturating_penalty(deviation: f64, weight: f64, steepness: f64) -> f64 {
    weight * (1.0 - (-steepness * deviation.max(0.0)).exp())
}

fn relative_deviation(actual: f64, target: f64) -> f64 {
    if target > 0.0 {
        (actual - target).abs() / target
    } else {
        actual.abs()
    }
}

/// Bonus dans [-1, 1] : score normalisé moyen des numéros choisis comparé à la moyenne de la plage.
fn influence_bonus(influence: &[InfluenceRecord], combination: &[u8]) -> f64 {
    if influence.is_empty() || combination.is_empty() {
        return 0.0;
    }
    let range_mean = influence.iter().map(|r| r.normalized_score).sum::<f64>() / influence.len() as f64;
    if range_mean <= 0.0 {
        return 0.0;
    }
    let selected: Vec<f64> = combination
        .iter()
        .filter_map(|&n| influence.iter().find(|r| r.number == n))
        .map(|r| r.normalized_score)
        .collect();
    if selected.is_empty() {
        return 0.0;
    }
    let mean = selected.iter().sum::<f64>() / selected.len() as f64;
    (mean / range_mean - 1.0).clamp(-1.0, 1.0)
}

/// Score de qualité 0-100 d'une combinaison : proximité de la distribution optimale,
/// absence de suites, influence des numéros choisis.
pub fn score_pattern(
    actual: &DistributionAnalysis,
    optimal: &OptimalDistribution,
    influence: &[InfluenceRecord],
    combination: &[u8],
) -> f64 {
    let sum_dev = relative_deviation(actual.sum as f64, optimal.target_sum);
    let spread_dev = relative_deviation(actual.spread as f64, optimal.target_spread);
    let parity_dev = (actual.even_odd_ratio - optimal.target_even_odd_ratio).abs();

    let score = BASE_SCORE
        - saturating_penalty(sum_dev, SUM_WEIGHT, 3.0)
        - saturating_penalty(spread_dev, SPREAD_WEIGHT, 3.0)
        - saturating_penalty(parity_dev, PARITY_WEIGHT, 1.0)
        - RUN_PENALTY * actual.consecutive_sequences as f64
        + INFLUENCE_WEIGHT * influence_bonus(influence, combination);

    score.clamp(0.0, 100.0)
}
