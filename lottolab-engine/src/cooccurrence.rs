use std::collections::HashMap;

use serde::Serialize;

use crate::frequency::count_numbers;

/// Co-apparition d'une paire, comparée à l'hypothèse d'indépendance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoOccurrence {
    pub pair: (u8, u8),
    pub count: u32,
    pub observed_frequency: f64,
    pub expected_frequency: f64,
    /// observé / attendu ; absent si l'attendu est nul.
    pub lift: Option<f64>,
    /// (lift - 1) / (lift + 1), borné dans [-1, 1].
    pub lift_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupOccurrence {
    pub numbers: Vec<u8>,
    pub count: u32,
    pub observed_frequency: f64,
}

fn valid_numbers(draw: &[u8], max_number: u8) -> Vec<u8> {
    let mut numbers: Vec<u8> = draw
        .iter()
        .copied()
        .filter(|&n| n >= 1 && n <= max_number)
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

pub fn lift_score(lift: Option<f64>) -> f64 {
    match lift {
        Some(l) if l.is_finite() && l >= 0.0 => (l - 1.0) / (l + 1.0),
        _ => 0.0,
    }
}

pub fn compute_cooccurrences<D: AsRef<[u8]>>(draws: &[D], max_number: u8, min_count: u32) -> Vec<CoOccurrence> {
    if draws.is_empty() {
        return Vec::new();
    }
    let total = draws.len() as f64;
    let marginals = count_numbers(draws, max_number);

    let mut joint: HashMap<(u8, u8), u32> = HashMap::new();
    for draw in draws {
        let numbers = valid_numbers(draw.as_ref(), max_number);
        for i in 0..numbers.len() {
            for j in (i + 1)..numbers.len() {
                *joint.entry((numbers[i], numbers[j])).or_insert(0) += 1;
            }
        }
    }

    let mut records: Vec<CoOccurrence> = joint
        .into_iter()
        .filter(|&(_, count)| count >= min_count)
        .map(|((a, b), count)| {
            let fa = marginals[(a - 1) as usize] as f64 / total;
            let fb = marginals[(b - 1) as usize] as f64 / total;
            let observed = count as f64 / total * 100.0;
            let expected = fa * fb * 100.0;
            let lift = if expected > 0.0 { Some(observed / expected) } else { None };
            CoOccurrence {
                pair: (a, b),
                count,
                observed_frequency: observed,
                expected_frequency: expected,
                lift,
                lift_score: lift_score(lift),
            }
        })
        .collect();

    records.sort_by(|a, b| {
        b.lift
            .unwrap_or(0.0)
            .partial_cmp(&a.lift.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.count.cmp(&a.count))
            .then(a.pair.cmp(&b.pair))
    });
    records
}

/// Triplets apparus ensemble au moins `min_count` fois.
pub fn compute_triplets<D: AsRef<[u8]>>(draws: &[D], max_number: u8, min_count: u32) -> Vec<GroupOccurrence> {
    if draws.is_empty() {
        return Vec::new();
    }
    let total = draws.len() as f64;

    let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
    for draw in draws {
        let numbers = valid_numbers(draw.as_ref(), max_number);
        let n = numbers.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    *counts.entry([numbers[i], numbers[j], numbers[k]]).or_insert(0) += 1;
                }
            }
        }
    }

    let mut groups: Vec<GroupOccurrence> = counts
        .into_iter()
        .filter(|&(_, count)| count >= min_count)
        .map(|(numbers, count)| GroupOccurrence {
            numbers: numbers.to_vec(),
            count,
            observed_frequency: count as f64 / total * 100.0,
        })
        .collect();

    groups.sort_by(|a, b| b.count.cmp(&a.count).then(a.numbers.cmp(&b.numbers)));
    groups
}
