use serde::Serialize;
use uuid::Uuid;

use lottolab_db::models::{DrawRecord, Game, UnsuccessfulCombination};

use crate::advanced::count_matches;
use crate::frequency::count_numbers;

/// Combinaison perdante passée près d'un tirage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearMiss {
    pub combination_id: Uuid,
    pub draw_date: String,
    pub matches: usize,
    pub matched: Vec<u8>,
}

/// Efficacité d'un numéro : part des jeux perdants qui l'utilisent
/// comparée à sa fréquence de sortie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberEfficiency {
    pub number: u8,
    pub usage_count: u32,
    pub usage_pct: f64,
    pub winning_count: u32,
    pub winning_pct: f64,
    /// winning_pct / usage_pct ; absent si le numéro n'a jamais été joué.
    pub efficiency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeReport {
    pub game: Game,
    pub wheel: Option<String>,
    pub combinations: usize,
    pub draws: usize,
    pub near_misses: Vec<NearMiss>,
    pub efficiency: Vec<NumberEfficiency>,
}

fn pct(count: u32, total: usize) -> f64 {
    if total > 0 {
        count as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Confronte les combinaisons perdantes à l'historique.
///
/// `min_matches` vaut par défaut le seuil de « presque gagné » du jeu.
pub fn analyze_outcomes(
    unsuccessful: &[UnsuccessfulCombination],
    history: &[DrawRecord],
    game: Game,
    wheel: Option<&str>,
    min_matches: Option<usize>,
) -> OutcomeReport {
    let threshold = min_matches.unwrap_or_else(|| game.near_miss_threshold());
    let combos: Vec<&UnsuccessfulCombination> =
        unsuccessful.iter().filter(|c| c.matches(game, wheel)).collect();
    let draws: Vec<(&str, &[u8])> = history
        .iter()
        .map(|d| (d.date.as_str(), d.numbers_for(wheel)))
        .filter(|(_, numbers)| !numbers.is_empty())
        .collect();

    let mut near_misses = Vec::new();
    for combo in &combos {
        for &(date, numbers) in &draws {
            let matches = count_matches(&combo.numbers, numbers);
            if matches >= threshold && matches > 0 {
                let matched = combo.numbers.iter().copied().filter(|n| numbers.contains(n)).collect();
                near_misses.push(NearMiss {
                    combination_id: combo.id,
                    draw_date: date.to_string(),
                    matches,
                    matched,
                });
            }
        }
    }
    near_misses.sort_by(|a, b| b.matches.cmp(&a.matches).then_with(|| b.draw_date.cmp(&a.draw_date)));

    let max = game.max_number();
    let played: Vec<&[u8]> = combos.iter().map(|c| c.numbers.as_slice()).collect();
    let drawn: Vec<&[u8]> = draws.iter().map(|&(_, numbers)| numbers).collect();
    let usage = count_numbers(&played, max);
    let winning = count_numbers(&drawn, max);

    let mut efficiency: Vec<NumberEfficiency> = (0..max as usize)
        .filter(|&i| usage[i] > 0)
        .map(|i| {
            let usage_pct = pct(usage[i], played.len());
            let winning_pct = pct(winning[i], drawn.len());
            NumberEfficiency {
                number: (i + 1) as u8,
                usage_count: usage[i],
                usage_pct,
                winning_count: winning[i],
                winning_pct,
                efficiency: (usage_pct > 0.0).then(|| winning_pct / usage_pct),
            }
        })
        .collect();
    efficiency.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then(a.number.cmp(&b.number))
    });

    tracing::debug!(
        combinations = combos.len(),
        draws = draws.len(),
        near_misses = near_misses.len(),
        "analyse des résultats"
    );

    OutcomeReport {
        game,
        wheel: wheel.map(str::to_string),
        combinations: combos.len(),
        draws: draws.len(),
        near_misses,
        efficiency,
    }
}
