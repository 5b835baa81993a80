use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

use crate::models::{AiProvider, DrawRecord, Game, GeneratedCombination, Strategy, UnsuccessfulCombination};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    game       TEXT NOT NULL,
    date       TEXT NOT NULL,
    wheel      TEXT NOT NULL DEFAULT '',
    numbers    TEXT NOT NULL,
    jolly      INTEGER,
    superstar  INTEGER,
    PRIMARY KEY (game, date, wheel)
);

CREATE TABLE IF NOT EXISTS unsuccessful (
    id          TEXT PRIMARY KEY,
    game        TEXT NOT NULL,
    wheel       TEXT,
    numbers     TEXT NOT NULL,
    jolly       INTEGER,
    superstar   INTEGER,
    strategy    TEXT,
    note        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS generated (
    id           TEXT PRIMARY KEY,
    game         TEXT NOT NULL,
    wheel        TEXT,
    numbers      TEXT NOT NULL,
    jolly        INTEGER,
    superstar    INTEGER,
    strategy     TEXT NOT NULL,
    is_ai        INTEGER NOT NULL DEFAULT 0,
    ai_provider  TEXT,
    created_at   TEXT NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lottolab.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    tracing::debug!(?path, "base ouverte");
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn encode_numbers(numbers: &[u8]) -> Result<String> {
    serde_json::to_string(numbers).context("Échec de l'encodage des numéros")
}

fn decode_numbers(raw: &str) -> Result<Vec<u8>> {
    serde_json::from_str(raw).with_context(|| format!("Numéros illisibles : '{}'", raw))
}

fn decode_game(raw: &str) -> Result<Game> {
    Game::from_id(raw).with_context(|| format!("Jeu inconnu en base : '{}'", raw))
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Horodatage illisible : '{}'", raw))?;
    Ok(ts.with_timezone(&Utc))
}

/// Insère un tirage. Pour les jeux à roues, une ligne par roue.
/// Retourne `true` si au moins une ligne a été ajoutée.
pub fn insert_draw(conn: &Connection, game: Game, draw: &DrawRecord) -> Result<bool> {
    let mut rows: Vec<(&str, &[u8])> = draw
        .wheels
        .iter()
        .map(|(w, n)| (w.as_str(), n.as_slice()))
        .collect();
    if rows.is_empty() {
        rows.push(("", draw.numbers.as_slice()));
    }

    let mut changed = 0;
    for (wheel, numbers) in rows {
        changed += conn.execute(
            "INSERT OR IGNORE INTO draws (game, date, wheel, numbers, jolly, superstar)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                game.id(),
                draw.date,
                wheel,
                encode_numbers(numbers)?,
                draw.jolly,
                draw.superstar,
            ],
        ).context("Échec de l'insertion")?;
    }
    Ok(changed > 0)
}

type DrawRow = (String, String, String, Option<u8>, Option<u8>);

/// Derniers tirages, le plus récent en premier. Avec une roue, seuls les
/// numéros de cette roue sont chargés dans `numbers`.
pub fn fetch_draws(conn: &Connection, game: Game, wheel: Option<&str>, limit: u32) -> Result<Vec<DrawRecord>> {
    let rows: Vec<DrawRow> = match wheel {
        Some(w) => {
            let mut stmt = conn.prepare(
                "SELECT date, wheel, numbers, jolly, superstar FROM draws
                 WHERE game = ?1 AND wheel = ?2
                 ORDER BY date DESC LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(params![game.id(), w, limit], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT date, wheel, numbers, jolly, superstar FROM draws
                 WHERE game = ?1 AND date IN (
                     SELECT DISTINCT date FROM draws WHERE game = ?1 ORDER BY date DESC LIMIT ?2
                 )
                 ORDER BY date DESC, wheel",
            )?;
            let rows = stmt
                .query_map(params![game.id(), limit], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    let mut draws: Vec<DrawRecord> = Vec::new();
    for (date, row_wheel, raw_numbers, jolly, superstar) in rows {
        let numbers = decode_numbers(&raw_numbers)?;
        if draws.last().map(|d| d.date != date).unwrap_or(true) {
            draws.push(DrawRecord {
                date: date.clone(),
                numbers: Vec::new(),
                jolly,
                superstar,
                wheels: BTreeMap::new(),
            });
        }
        let Some(draw) = draws.last_mut() else { continue };
        if row_wheel.is_empty() {
            draw.numbers = numbers;
        } else {
            if wheel.is_some() {
                draw.numbers = numbers.clone();
            }
            draw.wheels.insert(row_wheel, numbers);
        }
    }
    Ok(draws)
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(DISTINCT date) FROM draws WHERE game = ?1",
        [game.id()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn insert_unsuccessful(conn: &Connection, combo: &UnsuccessfulCombination) -> Result<()> {
    conn.execute(
        "INSERT INTO unsuccessful (id, game, wheel, numbers, jolly, superstar, strategy, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            combo.id.to_string(),
            combo.game.id(),
            combo.wheel,
            encode_numbers(&combo.numbers)?,
            combo.jolly,
            combo.superstar,
            combo.strategy.map(|s| s.as_str()),
            combo.note,
            combo.created_at.to_rfc3339(),
        ],
    ).context("Échec de l'enregistrement de la combinaison")?;
    Ok(())
}

type UnsuccessfulRow = (
    String, String, Option<String>, String, Option<u8>, Option<u8>, Option<String>, Option<String>, String,
);

/// Combinaisons perdantes, les plus récentes en premier.
pub fn fetch_unsuccessful(conn: &Connection, game: Option<Game>) -> Result<Vec<UnsuccessfulCombination>> {
    let mut stmt = conn.prepare(
        "SELECT id, game, wheel, numbers, jolly, superstar, strategy, note, created_at
         FROM unsuccessful WHERE ?1 IS NULL OR game = ?1
         ORDER BY created_at DESC",
    )?;
    let rows: Vec<UnsuccessfulRow> = stmt
        .query_map([game.map(|g| g.id())], |row| {
            Ok((
                row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?,
                row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, game, wheel, numbers, jolly, superstar, strategy, note, created_at)| {
            Ok(UnsuccessfulCombination {
                id: Uuid::parse_str(&id).with_context(|| format!("Identifiant illisible : '{}'", id))?,
                game: decode_game(&game)?,
                wheel,
                numbers: decode_numbers(&numbers)?,
                jolly,
                superstar,
                strategy: strategy.map(|s| s.parse::<Strategy>()).transpose()?,
                note,
                created_at: decode_timestamp(&created_at)?,
            })
        })
        .collect()
}

pub fn delete_unsuccessful(conn: &Connection, id: &Uuid) -> Result<bool> {
    let changed = conn.execute("DELETE FROM unsuccessful WHERE id = ?1", [id.to_string()])
        .context("Échec de la suppression")?;
    Ok(changed > 0)
}

/// Supprime toutes les combinaisons perdantes (d'un jeu, ou de tous).
pub fn clear_unsuccessful(conn: &Connection, game: Option<Game>) -> Result<usize> {
    let changed = conn.execute(
        "DELETE FROM unsuccessful WHERE ?1 IS NULL OR game = ?1",
        [game.map(|g| g.id())],
    ).context("Échec de la suppression")?;
    tracing::info!(changed, "combinaisons perdantes supprimées");
    Ok(changed)
}

pub fn insert_generated(conn: &Connection, combo: &GeneratedCombination) -> Result<()> {
    conn.execute(
        "INSERT INTO generated (id, game, wheel, numbers, jolly, superstar, strategy, is_ai, ai_provider, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            combo.id.to_string(),
            combo.game.id(),
            combo.wheel,
            encode_numbers(&combo.numbers)?,
            combo.jolly,
            combo.superstar,
            combo.strategy.as_str(),
            combo.is_ai,
            combo.ai_provider.map(|p| p.as_str()),
            combo.created_at.to_rfc3339(),
        ],
    ).context("Échec de l'enregistrement de la combinaison générée")?;
    Ok(())
}

type GeneratedRow = (
    String, String, Option<String>, String, Option<u8>, Option<u8>, String, bool, Option<String>, String,
);

pub fn fetch_generated(conn: &Connection, game: Game, limit: u32) -> Result<Vec<GeneratedCombination>> {
    let mut stmt = conn.prepare(
        "SELECT id, game, wheel, numbers, jolly, superstar, strategy, is_ai, ai_provider, created_at
         FROM generated WHERE game = ?1
         ORDER BY created_at DESC LIMIT ?2",
    )?;
    let rows: Vec<GeneratedRow> = stmt
        .query_map(params![game.id(), limit], |row| {
            Ok((
                row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?,
                row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, game, wheel, numbers, jolly, superstar, strategy, is_ai, provider, created_at)| {
            Ok(GeneratedCombination {
                id: Uuid::parse_str(&id).with_context(|| format!("Identifiant illisible : '{}'", id))?,
                game: decode_game(&game)?,
                wheel,
                numbers: decode_numbers(&numbers)?,
                jolly,
                superstar,
                strategy: strategy.parse::<Strategy>()?,
                is_ai,
                ai_provider: provider.map(|p| p.parse::<AiProvider>()).transpose()?,
                created_at: decode_timestamp(&created_at)?,
            })
        })
        .collect()
}
