use serde::Serialize;

use lottolab_db::models::Game;

/// Statistiques descriptives d'une combinaison.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionAnalysis {
    pub sum: u32,
    pub spread: u32,
    /// pairs / impairs ; sans impair, vaut le nombre de pairs.
    pub even_odd_ratio: f64,
    pub consecutive_sequences: u32,
    pub gap_analysis: Vec<u32>,
    pub average_gap: f64,
    /// decade_distribution[k] = numéros dans 10k+1 ..= 10k+10.
    pub decade_distribution: Vec<u32>,
}

/// Cible « idéale » pour un jeu : somme moyenne, étendue empirique, parité équilibrée.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalDistribution {
    pub target_sum: f64,
    pub target_spread: f64,
    pub target_even_odd_ratio: f64,
}

impl OptimalDistribution {
    pub fn for_range(count: usize, max_number: u8) -> Self {
        let max = max_number as f64;
        Self {
            target_sum: count as f64 * (max + 1.0) / 2.0,
            target_spread: max * 0.7,
            target_even_odd_ratio: 1.0,
        }
    }
}

pub fn optimal_distribution(game: Game) -> OptimalDistribution {
    OptimalDistribution::for_range(game.numbers_to_select(), game.max_number())
}

pub fn analyze_distribution(numbers: &[u8]) -> DistributionAnalysis {
    if numbers.is_empty() {
        return DistributionAnalysis::default();
    }

    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let sum: u32 = sorted.iter().map(|&n| n as u32).sum();
    let spread = if sorted.len() < 2 {
        0
    } else {
        (sorted[sorted.len() - 1] - sorted[0]) as u32
    };

    let even = sorted.iter().filter(|&&n| n % 2 == 0).count();
    let odd = sorted.len() - even;
    let even_odd_ratio = if odd == 0 { even as f64 } else { even as f64 / odd as f64 };

    let gap_analysis: Vec<u32> = sorted.windows(2).map(|w| (w[1] - w[0]) as u32).collect();
    let average_gap = if gap_analysis.is_empty() {
        0.0
    } else {
        gap_analysis.iter().sum::<u32>() as f64 / gap_analysis.len() as f64
    };

    let max_bucket = sorted
        .iter()
        .map(|&n| decade_of(n))
        .max()
        .unwrap_or(0);
    let mut decade_distribution = vec![0u32; max_bucket + 1];
    for &n in &sorted {
        decade_distribution[decade_of(n)] += 1;
    }

    DistributionAnalysis {
        sum,
        spread,
        even_odd_ratio,
        consecutive_sequences: count_consecutive_runs(&sorted),
        gap_analysis,
        average_gap,
        decade_distribution,
    }
}

fn decade_of(n: u8) -> usize {
    (n.saturating_sub(1) / 10) as usize
}

/// Séquences maximales d'au moins 3 entiers consécutifs. `sorted` doit être trié.
fn count_consecutive_runs(sorted: &[u8]) -> u32 {
    let mut unique = sorted.to_vec();
    unique.dedup();

    let mut runs = 0;
    let mut length = 1;
    for i in 1..=unique.len() {
        let continues = i < unique.len() && unique[i] as u16 == unique[i - 1] as u16 + 1;
        if continues {
            length += 1;
        } else {
            if length >= 3 {
                runs += 1;
            }
            length = 1;
        }
    }
    runs
}

/// Moyennes des statistiques de distribution sur tout un historique.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub draws: usize,
    pub average_sum: f64,
    pub average_spread: f64,
    pub average_even_odd_ratio: f64,
    pub average_consecutive_sequences: f64,
    pub decade_totals: Vec<u32>,
}

pub fn summarize_history<D: AsRef<[u8]>>(draws: &[D]) -> DistributionSummary {
    if draws.is_empty() {
        return DistributionSummary::default();
    }

    let n = draws.len() as f64;
    let mut summary = DistributionSummary {
        draws: draws.len(),
        ..DistributionSummary::default()
    };

    for draw in draws {
        let analysis = analyze_distribution(draw.as_ref());
        summary.average_sum += analysis.sum as f64 / n;
        summary.average_spread += analysis.spread as f64 / n;
        summary.average_even_odd_ratio += analysis.even_odd_ratio / n;
        summary.average_consecutive_sequences += analysis.consecutive_sequences as f64 / n;

        if summary.decade_totals.len() < analysis.decade_distribution.len() {
            summary.decade_totals.resize(analysis.decade_distribution.len(), 0);
        }
        for (total, count) in summary.decade_totals.iter_mut().zip(&analysis.decade_distribution) {
            *total += count;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        let a = analyze_distribution(&[]);
        assert_eq!(a, DistributionAnalysis::default());
        assert!(a.gap_analysis.is_empty());
        assert!(a.decade_distribution.is_empty());
    }

    #[test]
    fn test_single_number() {
        let a = analyze_distribution(&[42]);
        assert_eq!(a.sum, 42);
        assert_eq!(a.spread, 0);
        assert!(a.gap_analysis.is_empty());
        assert_eq!(a.average_gap, 0.0);
        assert_eq!(a.decade_distribution, vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_basic_fields() {
        let a = analyze_distribution(&[30, 1, 20, 3, 2, 10]);
        assert_eq!(a.sum, 66);
        assert_eq!(a.spread, 29);
        assert_eq!(a.gap_analysis, vec![1, 1, 7, 10, 10]);
        assert!((a.average_gap - 29.0 / 5.0).abs() < 1e-10);
        assert_eq!(a.consecutive_sequences, 1);
        // 2, 10, 20, 30 pairs ; 1, 3 impairs
        assert!((a.even_odd_ratio - 2.0).abs() < 1e-10);
        assert_eq!(a.decade_distribution, vec![4, 1, 1]);
    }

    #[test]
    fn test_even_odd_ratio_without_odd() {
        let a = analyze_distribution(&[2, 4, 6]);
        assert!((a.even_odd_ratio - 3.0).abs() < 1e-10);
        let b = analyze_distribution(&[1, 3, 5]);
        assert_eq!(b.even_odd_ratio, 0.0);
    }

    #[test]
    fn test_run_of_four_counts_once() {
        assert_eq!(analyze_distribution(&[1, 2, 3, 4, 20, 40]).consecutive_sequences, 1);
        assert_eq!(analyze_distribution(&[1, 2, 3, 7, 8, 9]).consecutive_sequences, 2);
        assert_eq!(analyze_distribution(&[1, 2, 10, 11, 40, 41]).consecutive_sequences, 0);
        assert_eq!(analyze_distribution(&[88, 89, 90]).consecutive_sequences, 1);
    }

    #[test]
    fn test_decade_boundaries() {
        let a = analyze_distribution(&[10, 11, 90]);
        assert_eq!(a.decade_distribution[0], 1);
        assert_eq!(a.decade_distribution[1], 1);
        assert_eq!(a.decade_distribution[8], 1);
        assert_eq!(a.decade_distribution.len(), 9);
    }

    #[test]
    fn test_optimal_superenalotto() {
        let optimal = optimal_distribution(Game::SuperEnalotto);
        assert!((optimal.target_sum - 273.0).abs() < 1e-10);
        assert!((optimal.target_spread - 63.0).abs() < 1e-10);
        assert_eq!(optimal.target_even_odd_ratio, 1.0);
    }

    #[test]
    fn test_optimal_lotto() {
        let optimal = optimal_distribution(Game::Lotto);
        assert!((optimal.target_sum - 227.5).abs() < 1e-10);
    }

    #[test]
    fn test_summarize_history() {
        let draws = vec![vec![1u8, 2, 3], vec![10, 20, 30]];
        let s = summarize_history(&draws);
        assert_eq!(s.draws, 2);
        assert!((s.average_sum - 33.0).abs() < 1e-10);
        assert!((s.average_spread - 11.0).abs() < 1e-10);
        assert!((s.average_consecutive_sequences - 0.5).abs() < 1e-10);
        assert_eq!(s.decade_totals, vec![4, 1, 1]);
    }

    #[test]
    fn test_summarize_empty() {
        let draws: Vec<Vec<u8>> = vec![];
        assert_eq!(summarize_history(&draws), DistributionSummary::default());
    }
}
