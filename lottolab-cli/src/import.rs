use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use lottolab_db::rusqlite::Connection;

use lottolab_db::db::insert_draw;
use lottolab_db::models::{DrawRecord, Game, validate_draw};

/// Accepte AAAA-MM-JJ ou JJ/MM/AAAA, renvoie AAAA-MM-JJ.
pub fn parse_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("Format de date invalide: '{}'", raw))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn optional_u8(record: &csv::StringRecord, idx: usize) -> Result<Option<u8>> {
    match record.get(idx).map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u8>()
            .map(Some)
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx)),
    }
}

/// Ligne : `date;roue;n1;…;nk[;jolly;superstar]`, roue vide hors Lotto.
pub fn parse_record(record: &csv::StringRecord, game: Game) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let date = parse_date(&get(0)?)?;
    let raw_wheel = get(1).unwrap_or_default();
    let wheel = game.validate_wheel((!raw_wheel.is_empty()).then_some(raw_wheel.as_str()))?;

    let k = game.numbers_to_select();
    let numbers = (2..2 + k).map(get_u8).collect::<Result<Vec<u8>>>()?;

    let mut draw = DrawRecord::new(date, Vec::new());
    match wheel {
        Some(w) => {
            draw.wheels.insert(w, numbers);
        }
        None => draw.numbers = numbers,
    }
    draw.jolly = optional_u8(record, 2 + k)?;
    draw.superstar = optional_u8(record, 3 + k)?;

    validate_draw(game, &draw)?;
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, game: Game, path: &Path) -> Result<ImportResult> {
    if !path.exists() {
        bail!("Fichier introuvable : {:?}", path);
    }
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} lignes {msg}")?);

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        pb.inc(1);
        match record_result {
            Ok(record) => {
                match parse_record(&record, game) {
                    Ok(draw) => {
                        match insert_draw(&tx, game, &draw) {
                            Ok(true) => result.inserted += 1,
                            Ok(false) => result.skipped += 1,
                            Err(e) => {
                                tracing::warn!(line = result.total_records, "Erreur insertion: {:#}", e);
                                result.errors += 1;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(line = result.total_records, "Erreur parsing: {:#}", e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(line = result.total_records, "Erreur lecture: {}", e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    pb.finish_with_message(format!("{} ({})", game, path.display()));
    tracing::info!(
        game = %game,
        inserted = result.inserted,
        skipped = result.skipped,
        errors = result.errors,
        "import terminé"
    );
    Ok(result)
}
