use lottolab_db::models::{DrawRecord, Game};
use lottolab_engine::advanced::AdvancedStatistics;
use lottolab_engine::config::{EngineConfig, InfluenceWeights};
use lottolab_engine::distribution::{analyze_distribution, optimal_distribution};
use lottolab_engine::frequency::GameStatistics;
use lottolab_engine::generator::generate;
use lottolab_engine::influence::compute_influence;
use lottolab_engine::pattern::score_pattern;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn combination(size: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::sample::subsequence((1u8..=90).collect::<Vec<_>>(), size)
}

fn history(size: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(combination(6), 0..size)
}

fn any_game() -> impl Strategy<Value = Game> {
    prop_oneof![Just(Game::SuperEnalotto), Just(Game::Lotto), Just(Game::DiecieLotto)]
}

fn any_strategy() -> impl Strategy<Value = lottolab_db::models::Strategy> {
    prop_oneof![
        Just(lottolab_db::models::Strategy::Standard),
        Just(lottolab_db::models::Strategy::HighVariability),
        Just(lottolab_db::models::Strategy::Ai),
    ]
}

proptest! {
    #[test]
    fn gaps_add_up_to_spread(numbers in combination(6)) {
        let analysis = analyze_distribution(&numbers);
        prop_assert_eq!(analysis.gap_analysis.len(), numbers.len() - 1);
        prop_assert_eq!(analysis.gap_analysis.iter().sum::<u32>(), analysis.spread);
        let max = *numbers.iter().max().unwrap() as u32;
        let min = *numbers.iter().min().unwrap() as u32;
        prop_assert_eq!(analysis.spread, max - min);
        prop_assert_eq!(analysis.decade_distribution.iter().sum::<u32>() as usize, numbers.len());
    }

    #[test]
    fn influence_covers_range_and_sums_to_hundred(
        draws in history(40),
        losing in history(10),
        window in proptest::option::of(1usize..30),
    ) {
        let records = compute_influence(&draws, 90, window, &losing, &InfluenceWeights::default());
        prop_assert_eq!(records.len(), 90);
        let total: f64 = records.iter().map(|r| r.normalized_score).sum();
        prop_assert!((total - 100.0).abs() < 1e-6, "total = {}", total);
        for r in &records {
            prop_assert!(r.normalized_score > 0.0);
            prop_assert!((0.0..=100.0).contains(&r.confidence));
        }
    }

    #[test]
    fn pattern_score_bounded(numbers in combination(6), draws in history(20)) {
        let influence = compute_influence(&draws, 90, None, &[] as &[Vec<u8>], &InfluenceWeights::default());
        let optimal = optimal_distribution(Game::SuperEnalotto);
        let score = score_pattern(&analyze_distribution(&numbers), &optimal, &influence, &numbers);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn extra_runs_never_raise_pattern_score(numbers in combination(6), extra in 1u32..4) {
        let optimal = optimal_distribution(Game::SuperEnalotto);
        let analysis = analyze_distribution(&numbers);
        let mut worse = analysis.clone();
        worse.consecutive_sequences += extra;
        let base = score_pattern(&analysis, &optimal, &[], &numbers);
        let penalised = score_pattern(&worse, &optimal, &[], &numbers);
        prop_assert!(penalised <= base);
    }

    #[test]
    fn generated_combinations_are_valid(
        game in any_game(),
        strategy in any_strategy(),
        draws in history(30),
        seed in any::<u64>(),
    ) {
        let config = EngineConfig::default();
        let wheel = game.wheels().first().copied();
        let n = game.numbers_to_select();
        let records: Vec<DrawRecord> = draws
            .iter()
            .enumerate()
            .map(|(i, numbers)| {
                let numbers: Vec<u8> = numbers.iter().copied().take(n).collect();
                let mut record = DrawRecord::new(format!("2023-{:02}-{:02}", i / 28 + 1, i % 28 + 1), Vec::new());
                match wheel {
                    Some(w) => {
                        record.wheels.insert(w.to_string(), numbers);
                    }
                    None => record.numbers = numbers,
                }
                record
            })
            .collect();

        let stats = GameStatistics::compute(game, wheel, &records, &[], &config);
        let advanced = AdvancedStatistics::compute(game, wheel, &records, &[], &[], &config);
        let mut rng = StdRng::seed_from_u64(seed);
        let generation = generate(game, strategy, &stats, Some(&advanced), &config, &mut rng);

        prop_assert_eq!(generation.numbers.len(), n);
        prop_assert!(generation.numbers.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(generation.numbers.iter().all(|&x| (1..=game.max_number()).contains(&x)));
        prop_assert_eq!(generation.jolly.is_some(), game.has_jolly());
        if let Some(jolly) = generation.jolly {
            prop_assert!(!generation.numbers.contains(&jolly));
        }
        prop_assert!((0.0..=100.0).contains(&generation.pattern_score));
    }
}
