use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use crate::import::ImportResult;
use lottolab_db::models::{DrawRecord, Game, GeneratedCombination, UnsuccessfulCombination};
use lottolab_engine::advanced::AdvancedStatistics;
use lottolab_engine::ai::AiRecommendation;
use lottolab_engine::frequency::GameStatistics;
use lottolab_engine::generator::Generation;
use lottolab_engine::outcome::OutcomeReport;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn secondary(jolly: Option<u8>, superstar: Option<u8>) -> String {
    match (jolly, superstar) {
        (None, None) => "—".to_string(),
        (j, s) => format!(
            "J {} / S {}",
            j.map(|n| n.to_string()).unwrap_or_else(|| "—".into()),
            s.map(|n| n.to_string()).unwrap_or_else(|| "—".into()),
        ),
    }
}

fn score_color(score: f64) -> Color {
    if score >= 70.0 {
        Color::Green
    } else if score >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn display_draws(game: Game, draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    if game.wheels().is_empty() {
        let mut table = new_table(vec!["Date", "Numéros", "Jolly / Superstar"]);
        for draw in draws {
            table.add_row(vec![
                draw.date.clone(),
                join_numbers(&draw.numbers),
                secondary(draw.jolly, draw.superstar),
            ]);
        }
        println!("{table}");
        return;
    }

    let mut table = new_table(vec!["Date", "Roue", "Numéros"]);
    for draw in draws {
        for (wheel, numbers) in &draw.wheels {
            table.add_row(vec![draw.date.clone(), wheel.clone(), join_numbers(numbers)]);
        }
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(stats: &GameStatistics, top: usize) {
    let scope = match &stats.wheel {
        Some(w) => format!("{} ({})", stats.game, w),
        None => stats.game.to_string(),
    };
    println!(
        "\n📊 {} : {} tirages, {} combinaisons perdantes\n",
        scope, stats.total_draws, stats.total_unsuccessful
    );

    println!("── Fréquents ──");
    let mut table = new_table(vec!["Numéro", "Sorties", "%"]);
    for f in stats.frequent.iter().take(top) {
        table.add_row(vec![format!("{:2}", f.number), f.count.to_string(), format!("{:.1}", f.percentage)]);
    }
    println!("{table}");

    println!("\n── Retardataires ──");
    let mut table = new_table(vec!["Numéro", "Retard"]);
    for d in stats.delayed.iter().take(top) {
        table.add_row(vec![format!("{:2}", d.number), d.delay.to_string()]);
    }
    println!("{table}");

    if !stats.unlucky_numbers.is_empty() {
        println!("\n── Numéros malchanceux ──");
        let mut table = new_table(vec!["Numéro", "Jeux perdants", "%", "Évité"]);
        for f in stats.unlucky_numbers.iter().take(top) {
            let avoided = stats.is_unlucky_number(f.number);
            table.add_row(vec![
                Cell::new(format!("{:2}", f.number)),
                Cell::new(f.count),
                Cell::new(format!("{:.1}", f.percentage)),
                Cell::new(if avoided { "oui" } else { "non" }).fg(if avoided { Color::Red } else { Color::White }),
            ]);
        }
        println!("{table}");
    }

    if !stats.unlucky_pairs.is_empty() {
        println!("\n── Paires malchanceuses ──");
        let mut table = new_table(vec!["Paire", "Jeux perdants"]);
        for p in stats.unlucky_pairs.iter().take(top) {
            table.add_row(vec![format!("{} - {}", p.pair.0, p.pair.1), p.count.to_string()]);
        }
        println!("{table}");
    }
}

pub fn display_generations(generations: &[Generation]) {
    println!("\n🎲 Combinaisons suggérées\n");

    let mut table = new_table(vec!["#", "Numéros", "Jolly / Superstar", "Stratégie", "Score"]);
    for (i, g) in generations.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(join_numbers(&g.numbers)),
            Cell::new(secondary(g.jolly, g.superstar)),
            Cell::new(g.strategy),
            Cell::new(format!("{:.1}", g.pattern_score)).fg(score_color(g.pattern_score)),
        ]);
    }
    println!("{table}");

    for (i, g) in generations.iter().enumerate().filter(|(_, g)| !g.reasons.is_empty()) {
        println!("\nCombinaison {} :", i + 1);
        for reason in &g.reasons {
            println!("  • {}", reason);
        }
        if let Some(confidence) = g.confidence {
            println!("  Confiance statistique : {:.0} / 100", confidence);
        }
    }
    println!("\nLes scores classent des combinaisons ; ils n'indiquent aucune chance de gain.");
}

pub fn display_unsuccessful(combos: &[UnsuccessfulCombination]) {
    if combos.is_empty() {
        println!("Aucune combinaison perdante enregistrée.");
        return;
    }

    let mut table = new_table(vec!["Id", "Jeu", "Roue", "Numéros", "Jolly / Superstar", "Stratégie", "Note", "Ajoutée"]);
    for c in combos {
        table.add_row(vec![
            c.id.to_string(),
            c.game.to_string(),
            c.wheel.clone().unwrap_or_else(|| "—".into()),
            join_numbers(&c.numbers),
            secondary(c.jolly, c.superstar),
            c.strategy.map(|s| s.to_string()).unwrap_or_else(|| "—".into()),
            c.note.clone().unwrap_or_default(),
            c.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_generated(combos: &[GeneratedCombination]) {
    if combos.is_empty() {
        println!("Aucune combinaison générée enregistrée.");
        return;
    }

    let mut table = new_table(vec!["Date", "Roue", "Numéros", "Jolly / Superstar", "Stratégie", "IA"]);
    for c in combos {
        let ai = match (c.is_ai, c.ai_provider) {
            (_, Some(provider)) => provider.to_string(),
            (true, None) => "locale".to_string(),
            (false, None) => "—".to_string(),
        };
        table.add_row(vec![
            c.created_at.format("%Y-%m-%d %H:%M").to_string(),
            c.wheel.clone().unwrap_or_else(|| "—".into()),
            join_numbers(&c.numbers),
            secondary(c.jolly, c.superstar),
            c.strategy.to_string(),
            ai,
        ]);
    }
    println!("{table}");
}

pub fn display_advanced(advanced: &AdvancedStatistics, top: usize) {
    let d = &advanced.distribution;
    println!("\n📐 Distribution sur {} tirages", d.draws);
    println!(
        "  Somme moyenne {:.1} (cible {:.1}), étendue moyenne {:.1} (cible {:.1}), pairs/impairs {:.2}",
        d.average_sum,
        advanced.optimal.target_sum,
        d.average_spread,
        advanced.optimal.target_spread,
        d.average_even_odd_ratio
    );
    println!("  Suites de 3+ par tirage : {:.2}", d.average_consecutive_sequences);

    println!("\n── Influence ──");
    let mut table = new_table(vec!["Numéro", "Hist. %", "Récent %", "Pénalité", "Score", "Confiance"]);
    for r in lottolab_engine::influence::top_influence(&advanced.influence, top) {
        table.add_row(vec![
            format!("{:2}", r.number),
            format!("{:.1}", r.historical_frequency),
            format!("{:.1}", r.recent_frequency),
            format!("{:.1}", r.unsuccessful_penalty),
            format!("{:.2}", r.normalized_score),
            format!("{:.0}", r.confidence),
        ]);
    }
    println!("{table}");

    if !advanced.co_occurrences.is_empty() {
        println!("\n── Paires ──");
        let mut table = new_table(vec!["Paire", "Ensemble", "Observé %", "Attendu %", "Lift"]);
        for c in advanced.co_occurrences.iter().take(top) {
            let lift = c.lift.map(|l| format!("{:.2}", l)).unwrap_or_else(|| "—".into());
            table.add_row(vec![
                Cell::new(format!("{} - {}", c.pair.0, c.pair.1)),
                Cell::new(c.count),
                Cell::new(format!("{:.1}", c.observed_frequency)),
                Cell::new(format!("{:.1}", c.expected_frequency)),
                Cell::new(lift).fg(if c.lift_score > 0.0 { Color::Green } else { Color::White }),
            ]);
        }
        println!("{table}");
    }

    if !advanced.triplets.is_empty() {
        println!("\n── Triplets ──");
        let mut table = new_table(vec!["Triplet", "Ensemble", "%"]);
        for t in advanced.triplets.iter().take(top) {
            table.add_row(vec![join_numbers(&t.numbers), t.count.to_string(), format!("{:.1}", t.observed_frequency)]);
        }
        println!("{table}");
    }

    if !advanced.expected_values.is_empty() {
        println!("\n── Combinaisons évaluées ──");
        let mut table = new_table(vec!["Numéros", "Communs moyens", "Répartition", "Score"]);
        for ev in &advanced.expected_values {
            let spread = ev
                .match_distribution
                .iter()
                .enumerate()
                .filter(|(_, p)| **p > 0.0)
                .map(|(k, p)| format!("{}: {:.1}%", k, p * 100.0))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                Cell::new(join_numbers(&ev.numbers)),
                Cell::new(format!("{:.2}", ev.expected_matches)),
                Cell::new(spread),
                Cell::new(format!("{:.1}", ev.pattern_score)).fg(score_color(ev.pattern_score)),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_outcomes(report: &OutcomeReport, top: usize) {
    println!(
        "\n🔎 {} combinaisons perdantes face à {} tirages",
        report.combinations, report.draws
    );

    if report.near_misses.is_empty() {
        println!("Aucune combinaison passée près d'un tirage.");
    } else {
        println!("\n── Presque gagnées ──");
        let mut table = new_table(vec!["Tirage", "Communs", "Numéros communs", "Combinaison"]);
        for m in report.near_misses.iter().take(top) {
            table.add_row(vec![
                m.draw_date.clone(),
                m.matches.to_string(),
                join_numbers(&m.matched),
                m.combination_id.to_string(),
            ]);
        }
        println!("{table}");
    }

    if !report.efficiency.is_empty() {
        println!("\n── Efficacité des numéros joués ──");
        let mut table = new_table(vec!["Numéro", "Joué", "Joué %", "Sorti %", "Efficacité"]);
        for e in report.efficiency.iter().take(top) {
            table.add_row(vec![
                format!("{:2}", e.number),
                e.usage_count.to_string(),
                format!("{:.1}", e.usage_pct),
                format!("{:.1}", e.winning_pct),
                e.efficiency.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "—".into()),
            ]);
        }
        println!("{table}");
    }
}

pub fn display_ai_recommendation(rec: &AiRecommendation) {
    println!("\n✅ Réponse IA valide\n");
    let mut table = new_table(vec!["Numéros", "Jolly / Superstar", "Confiance"]);
    table.add_row(vec![
        join_numbers(&rec.numbers),
        secondary(rec.jolly, rec.superstar),
        format!("{:.0} / 100", rec.confidence),
    ]);
    println!("{table}");
    for reason in &rec.reasons {
        println!("  • {}", reason);
    }
}
