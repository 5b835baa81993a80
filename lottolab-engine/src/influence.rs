use serde::Serialize;

use crate::config::InfluenceWeights;
use crate::frequency::count_numbers;

/// Classement d'un numéro. Ce n'est pas une probabilité de sortie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceRecord {
    pub number: u8,
    pub historical_frequency: f64,
    pub recent_frequency: f64,
    pub unsuccessful_penalty: f64,
    pub influence_score: f64,
    /// Somme sur toute la plage = 100.
    pub normalized_score: f64,
    pub confidence: f64,
}

/// Nombre de tirages à partir duquel la confiance approche 63 %.
const CONFIDENCE_SCALE: f64 = 50.0;

fn participation(counts: &[u32], total: usize) -> Vec<f64> {
    counts
        .iter()
        .map(|&c| if total > 0 { c as f64 / total as f64 * 100.0 } else { 0.0 })
        .collect()
}

/// Calcule l'influence des numéros 1..=max_number.
///
/// * `draws` : historique, le plus récent en premier.
/// * `recent_window` : nombre de tirages récents ; `None` = tout l'historique.
/// * `unsuccessful` : combinaisons perdantes de l'utilisateur, sources de pénalité.
pub fn compute_influence<D: AsRef<[u8]>, U: AsRef<[u8]>>(
    draws: &[D],
    max_number: u8,
    recent_window: Option<usize>,
    unsuccessful: &[U],
    weights: &InfluenceWeights,
) -> Vec<InfluenceRecord> {
    let total = draws.len();
    let window = recent_window.unwrap_or(total).min(total);

    let historical = participation(&count_numbers(draws, max_number), total);
    let recent = participation(&count_numbers(&draws[..window], max_number), window);
    let losing = participation(&count_numbers(unsuccessful, max_number), unsuccessful.len());

    let sample_factor = 1.0 - (-(total as f64) / CONFIDENCE_SCALE).exp();

    let mut records: Vec<InfluenceRecord> = (0..max_number as usize)
        .map(|i| {
            let penalty = losing[i] * weights.penalty;
            let influence_score =
                weights.historical * historical[i] + weights.recent * recent[i] - penalty;

            let both = historical[i] + recent[i];
            let agreement = if both > 0.0 {
                1.0 - (historical[i] - recent[i]).abs() / both
            } else {
                1.0
            };
            let confidence = (100.0 * sample_factor * (0.5 + 0.5 * agreement)).clamp(0.0, 100.0);

            InfluenceRecord {
                number: (i + 1) as u8,
                historical_frequency: historical[i],
                recent_frequency: recent[i],
                unsuccessful_penalty: penalty,
                influence_score,
                normalized_score: 0.0,
                confidence,
            }
        })
        .collect();

    normalize(&mut records);
    records
}

/// Décale les scores pour qu'ils soient tous positifs, puis les ramène à une somme de 100.
fn normalize(records: &mut [InfluenceRecord]) {
    let min = records
        .iter()
        .map(|r| r.influence_score)
        .fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return;
    }
    let shifted: Vec<f64> = records.iter().map(|r| r.influence_score - min + 1.0).collect();
    let total: f64 = shifted.iter().sum();
    for (record, s) in records.iter_mut().zip(shifted) {
        record.normalized_score = s / total * 100.0;
    }
}

/// Les `n` meilleurs numéros par score normalisé.
pub fn top_influence(records: &[InfluenceRecord], n: usize) -> Vec<&InfluenceRecord> {
    let mut sorted: Vec<&InfluenceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.normalized_score
            .partial_cmp(&a.normalized_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: &[Vec<u8>] = &[];

    fn sample_draws() -> Vec<Vec<u8>> {
        vec![
            vec![1, 2, 3, 4, 5, 6],
            vec![1, 7, 8, 9, 10, 11],
            vec![12, 13, 14, 15, 16, 17],
            vec![1, 2, 18, 19, 20, 21],
        ]
    }

    #[test]
    fn test_one_record_per_number() {
        let records = compute_influence(&sample_draws(), 90, None, NONE, &InfluenceWeights::default());
        assert_eq!(records.len(), 90);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.number as usize, i + 1);
        }
        let never = &records[89];
        assert_eq!(never.historical_frequency, 0.0);
        assert_eq!(never.recent_frequency, 0.0);
    }

    #[test]
    fn test_normalized_sums_to_hundred() {
        let records = compute_influence(&sample_draws(), 90, Some(2), NONE, &InfluenceWeights::default());
        let sum: f64 = records.iter().map(|r| r.normalized_score).sum();
        assert!((sum - 100.0).abs() < 0.5, "Sum = {}", sum);
    }

    #[test]
    fn test_empty_history_is_uniform() {
        let draws: Vec<Vec<u8>> = vec![];
        let records = compute_influence(&draws, 90, Some(10), NONE, &InfluenceWeights::default());
        assert_eq!(records.len(), 90);
        for r in &records {
            assert!((r.normalized_score - 100.0 / 90.0).abs() < 1e-9);
            assert_eq!(r.confidence, 0.0);
            assert_eq!(r.unsuccessful_penalty, 0.0);
        }
    }

    #[test]
    fn test_frequencies() {
        let records = compute_influence(&sample_draws(), 90, Some(2), NONE, &InfluenceWeights::default());
        // 1 : 3 sorties sur 4, 2 sur les 2 derniers tirages
        assert!((records[0].historical_frequency - 75.0).abs() < 1e-10);
        assert!((records[0].recent_frequency - 100.0).abs() < 1e-10);
        // 12 : absent de la fenêtre récente
        assert!((records[11].historical_frequency - 25.0).abs() < 1e-10);
        assert_eq!(records[11].recent_frequency, 0.0);
    }

    #[test]
    fn test_recent_frequency_raises_score() {
        let records = compute_influence(&sample_draws(), 90, Some(1), NONE, &InfluenceWeights::default());
        // 3 (tirage le plus récent) et 12 (plus ancien) ont la même fréquence historique
        assert!(records[2].influence_score > records[11].influence_score);
    }

    #[test]
    fn test_penalty_lowers_score() {
        let draws = sample_draws();
        let losing = vec![vec![1u8, 30, 31, 32, 33, 34], vec![1, 40, 41, 42, 43, 44]];
        let without = compute_influence(&draws, 90, None, NONE, &InfluenceWeights::default());
        let with = compute_influence(&draws, 90, None, &losing, &InfluenceWeights::default());
        assert_eq!(without[0].unsuccessful_penalty, 0.0);
        assert!(with[0].unsuccessful_penalty > 0.0);
        assert!(with[0].influence_score < without[0].influence_score);
        assert!(with[0].normalized_score < without[0].normalized_score);
    }

    #[test]
    fn test_confidence_grows_with_history() {
        let short = compute_influence(&sample_draws(), 90, None, NONE, &InfluenceWeights::default());
        let long_draws: Vec<Vec<u8>> = sample_draws().into_iter().cycle().take(200).collect();
        let long = compute_influence(&long_draws, 90, None, NONE, &InfluenceWeights::default());
        assert!(long[0].confidence > short[0].confidence);
        assert!(long.iter().all(|r| (0.0..=100.0).contains(&r.confidence)));
    }

    #[test]
    fn test_top_influence() {
        let records = compute_influence(&sample_draws(), 90, None, NONE, &InfluenceWeights::default());
        let top = top_influence(&records, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].number, 1);
        assert!(top[0].normalized_score >= top[1].normalized_score);
    }
}
