use std::collections::HashMap;

use serde::Serialize;

use lottolab_db::models::{draw_numbers, DrawRecord, Game, UnsuccessfulCombination};

use crate::config::EngineConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub number: u8,
    pub count: u32,
    /// count / combinaisons considérées × 100 (taux de participation).
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayRecord {
    pub number: u8,
    pub delay: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnluckyPair {
    pub pair: (u8, u8),
    pub count: u32,
}

/// Comptage par numéro (index = numéro - 1), numéros hors plage ignorés.
pub(crate) fn count_numbers<D: AsRef<[u8]>>(draws: &[D], max_number: u8) -> Vec<u32> {
    let mut counts = vec![0u32; max_number as usize];
    for draw in draws {
        for &n in draw.as_ref() {
            if n >= 1 && n <= max_number {
                counts[(n - 1) as usize] += 1;
            }
        }
    }
    counts
}

/// Fréquences des numéros apparus, triées par nombre d'apparitions décroissant.
pub fn compute_frequencies<D: AsRef<[u8]>>(draws: &[D], max_number: u8) -> Vec<Frequency> {
    let total = draws.len();
    let counts = count_numbers(draws, max_number);

    let mut frequencies: Vec<Frequency> = counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(i, &count)| Frequency {
            number: (i + 1) as u8,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();

    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    frequencies
}

/// Retard de chaque numéro (draws[0] = le plus récent), les plus en retard d'abord.
/// Un numéro jamais sorti a un retard égal à la taille de l'historique.
pub fn compute_delays<D: AsRef<[u8]>>(draws: &[D], max_number: u8) -> Vec<DelayRecord> {
    let mut delays = vec![draws.len() as u32; max_number as usize];
    let mut seen = vec![false; max_number as usize];

    for (t, draw) in draws.iter().enumerate() {
        for &n in draw.as_ref() {
            if n >= 1 && n <= max_number {
                let idx = (n - 1) as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    delays[idx] = t as u32;
                }
            }
        }
    }

    let mut records: Vec<DelayRecord> = delays
        .into_iter()
        .enumerate()
        .map(|(i, delay)| DelayRecord {
            number: (i + 1) as u8,
            delay,
        })
        .collect();

    records.sort_by(|a, b| b.delay.cmp(&a.delay).then(a.number.cmp(&b.number)));
    records
}

pub fn compute_unlucky_numbers<D: AsRef<[u8]>>(combos: &[D], max_number: u8) -> Vec<Frequency> {
    compute_frequencies(combos, max_number)
}

pub(crate) fn ordered_pair(a: u8, b: u8) -> (u8, u8) {
    if a <= b { (a, b) } else { (b, a) }
}

pub fn compute_unlucky_pairs<D: AsRef<[u8]>>(combos: &[D], min_count: u32) -> Vec<UnluckyPair> {
    let mut counts: HashMap<(u8, u8), u32> = HashMap::new();

    for combo in combos {
        let mut numbers = combo.as_ref().to_vec();
        numbers.sort_unstable();
        numbers.dedup();
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                *counts.entry((numbers[i], numbers[j])).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<UnluckyPair> = counts
        .into_iter()
        .filter(|&(_, count)| count >= min_count)
        .map(|(pair, count)| UnluckyPair { pair, count })
        .collect();

    pairs.sort_by(|a, b| b.count.cmp(&a.count).then(a.pair.cmp(&b.pair)));
    pairs
}

/// Statistiques par jeu (et par roue pour le Lotto) consommées par le générateur.
#[derive(Debug, Clone, Serialize)]
pub struct GameStatistics {
    pub game: Game,
    pub wheel: Option<String>,
    pub total_draws: usize,
    pub total_unsuccessful: usize,
    pub frequent: Vec<Frequency>,
    pub delayed: Vec<DelayRecord>,
    pub unlucky_numbers: Vec<Frequency>,
    pub unlucky_pairs: Vec<UnluckyPair>,
    pub unlucky_threshold_pct: f64,
}

impl GameStatistics {
    pub fn compute(
        game: Game,
        wheel: Option<&str>,
        history: &[DrawRecord],
        unsuccessful: &[UnsuccessfulCombination],
        config: &EngineConfig,
    ) -> Self {
        let max = game.max_number();
        let draws = draw_numbers(history, wheel);
        let losing = unsuccessful_numbers(unsuccessful, game, wheel);

        let stats = Self {
            game,
            wheel: wheel.map(str::to_string),
            total_draws: draws.len(),
            total_unsuccessful: losing.len(),
            frequent: compute_frequencies(&draws, max),
            delayed: compute_delays(&draws, max),
            unlucky_numbers: compute_unlucky_numbers(&losing, max),
            unlucky_pairs: compute_unlucky_pairs(&losing, config.min_unlucky_pair),
            unlucky_threshold_pct: config.unlucky_threshold_pct,
        };
        tracing::debug!(
            game = %game,
            draws = stats.total_draws,
            unsuccessful = stats.total_unsuccessful,
            "statistiques calculées"
        );
        stats
    }

    /// Statistiques vides : le générateur retombe alors sur le tirage uniforme.
    pub fn empty(game: Game, wheel: Option<&str>) -> Self {
        Self::compute(game, wheel, &[], &[], &EngineConfig::default())
    }

    /// Un numéro est « malchanceux » s'il figure parmi les perdants au-delà du seuil.
    pub fn is_unlucky_number(&self, number: u8) -> bool {
        self.unlucky_numbers
            .iter()
            .any(|f| f.number == number && f.percentage > self.unlucky_threshold_pct)
    }

    pub fn is_unlucky_pair(&self, a: u8, b: u8) -> bool {
        let pair = ordered_pair(a, b);
        self.unlucky_pairs.iter().any(|p| p.pair == pair)
    }
}

/// Numéros des combinaisons perdantes du jeu et de la roue demandés.
pub fn unsuccessful_numbers<'a>(
    unsuccessful: &'a [UnsuccessfulCombination],
    game: Game,
    wheel: Option<&str>,
) -> Vec<&'a [u8]> {
    unsuccessful
        .iter()
        .filter(|c| c.matches(game, wheel))
        .map(|c| c.numbers.as_slice())
        .collect()
}
