use serde::Serialize;

use lottolab_db::models::{draw_numbers, DrawRecord, Game, UnsuccessfulCombination};

use crate::config::EngineConfig;
use crate::cooccurrence::{compute_cooccurrences, compute_triplets, CoOccurrence, GroupOccurrence};
use crate::distribution::{analyze_distribution, optimal_distribution, summarize_history, DistributionSummary, OptimalDistribution};
use crate::frequency::unsuccessful_numbers;
use crate::influence::{compute_influence, InfluenceRecord};
use crate::pattern::score_pattern;

/// Comportement historique d'une combinaison : combien de numéros elle aurait eu
/// en commun, en moyenne, avec chaque tirage passé.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedValue {
    pub numbers: Vec<u8>,
    pub expected_matches: f64,
    /// match_distribution[k] = part des tirages avec exactement k numéros communs.
    pub match_distribution: Vec<f64>,
    pub pattern_score: f64,
}

pub fn count_matches(combination: &[u8], draw: &[u8]) -> usize {
    combination.iter().filter(|n| draw.contains(n)).count()
}

pub fn expected_value<D: AsRef<[u8]>>(
    combination: &[u8],
    draws: &[D],
    optimal: &OptimalDistribution,
    influence: &[InfluenceRecord],
) -> ExpectedValue {
    let mut match_distribution = vec![0.0f64; combination.len() + 1];
    let mut expected_matches = 0.0;

    if !draws.is_empty() {
        let share = 1.0 / draws.len() as f64;
        for draw in draws {
            let k = count_matches(combination, draw.as_ref());
            match_distribution[k] += share;
            expected_matches += k as f64 * share;
        }
    }

    let analysis = analyze_distribution(combination);
    ExpectedValue {
        numbers: combination.to_vec(),
        expected_matches,
        match_distribution,
        pattern_score: score_pattern(&analysis, optimal, influence, combination),
    }
}

/// Agrégat recalculé à chaque changement d'historique ou de combinaisons perdantes.
#[derive(Debug, Clone, Serialize)]
pub struct AdvancedStatistics {
    pub game: Game,
    pub wheel: Option<String>,
    pub distribution: DistributionSummary,
    pub optimal: OptimalDistribution,
    pub co_occurrences: Vec<CoOccurrence>,
    pub triplets: Vec<GroupOccurrence>,
    pub influence: Vec<InfluenceRecord>,
    pub expected_values: Vec<ExpectedValue>,
    /// Score moyen des combinaisons évaluées, ou du dernier tirage à défaut.
    pub pattern_score: f64,
}

impl AdvancedStatistics {
    pub fn compute(
        game: Game,
        wheel: Option<&str>,
        history: &[DrawRecord],
        unsuccessful: &[UnsuccessfulCombination],
        evaluate: &[Vec<u8>],
        config: &EngineConfig,
    ) -> Self {
        let max = game.max_number();
        let draws = draw_numbers(history, wheel);
        let losing = unsuccessful_numbers(unsuccessful, game, wheel);
        let optimal = optimal_distribution(game);

        let influence = compute_influence(&draws, max, config.recent_window, &losing, &config.influence);
        let expected_values: Vec<ExpectedValue> = evaluate
            .iter()
            .map(|combo| expected_value(combo, &draws, &optimal, &influence))
            .collect();

        let pattern_score = if !expected_values.is_empty() {
            expected_values.iter().map(|e| e.pattern_score).sum::<f64>() / expected_values.len() as f64
        } else if let Some(latest) = draws.first() {
            score_pattern(&analyze_distribution(latest), &optimal, &influence, latest)
        } else {
            0.0
        };

        Self {
            game,
            wheel: wheel.map(str::to_string),
            distribution: summarize_history(&draws),
            optimal,
            co_occurrences: compute_cooccurrences(&draws, max, config.min_cooccurrence),
            triplets: compute_triplets(&draws, max, config.min_cooccurrence),
            influence,
            expected_values,
            pattern_score,
        }
    }

    pub fn influence_of(&self, number: u8) -> Option<&InfluenceRecord> {
        self.influence.iter().find(|r| r.number == number)
    }

    /// Paires à lift positif, les plus fortes d'abord.
    pub fn positive_pairs(&self) -> impl Iterator<Item = &CoOccurrence> {
        self.co_occurrences.iter().filter(|c| c.lift_score > 0.0)
    }
}
