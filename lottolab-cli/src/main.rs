mod display;
mod import;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use lottolab_db::db::{
    clear_unsuccessful, count_draws, db_path, delete_unsuccessful, fetch_draws, fetch_generated,
    fetch_unsuccessful, insert_generated, insert_unsuccessful, migrate, open_db,
};
use lottolab_db::models::{AiProvider, Game, Strategy, UnsuccessfulCombination};
use lottolab_db::rusqlite::Connection;
use lottolab_engine::EngineConfig;
use lottolab_engine::advanced::AdvancedStatistics;
use lottolab_engine::ai::{build_payload, validate_response};
use lottolab_engine::frequency::GameStatistics;
use lottolab_engine::generator::generate;
use lottolab_engine::outcome::analyze_outcomes;

use crate::display::{
    display_advanced, display_ai_recommendation, display_draws, display_generated,
    display_generations, display_import_summary, display_outcomes, display_stats,
    display_unsuccessful,
};

#[derive(Parser)]
#[command(name = "lottolab", about = "Statistiques et suggestions pour SuperEnalotto, Lotto et 10eLotto")]
struct Cli {
    /// Fichier de réglages
    #[arg(long, global = true, default_value = "lottolab.json")]
    config: PathBuf,

    /// Logs détaillés
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct Target {
    /// Jeu
    #[arg(short, long, value_enum, default_value = "superenalotto")]
    game: Game,

    /// Roue (Lotto uniquement)
    #[arg(long)]
    wheel: Option<String>,
}

impl Target {
    fn resolve(&self) -> Result<(Game, Option<String>)> {
        let wheel = self.game.validate_wheel(self.wheel.as_deref())?;
        Ok((self.game, wheel))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Importer des tirages depuis un fichier CSV (date;roue;n1;…;nk[;jolly;superstar])
    Import {
        /// Jeu (superenalotto, lotto, 10elotto), repli sur superenalotto si inconnu
        #[arg(short, long, default_value = "superenalotto")]
        game: String,

        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        #[command(flatten)]
        target: Target,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Fréquences, retards et numéros malchanceux
    Stats {
        #[command(flatten)]
        target: Target,

        /// Fenêtre d'analyse (nombre de tirages, tout l'historique par défaut)
        #[arg(short, long)]
        window: Option<u32>,

        /// Lignes par tableau
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Générer des combinaisons
    Generate {
        #[command(flatten)]
        target: Target,

        #[arg(short, long, value_enum, default_value = "standard")]
        strategy: Strategy,

        /// Nombre de combinaisons
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Enregistrer les combinaisons générées
        #[arg(long)]
        save: bool,
    },

    /// Historique des combinaisons générées
    History {
        #[arg(short, long, value_enum, default_value = "superenalotto")]
        game: Game,

        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Gérer les combinaisons perdantes
    Unsuccessful {
        #[command(subcommand)]
        action: UnsuccessfulAction,
    },

    /// Distribution, influence, paires et évaluation de combinaisons
    Analyze {
        #[command(flatten)]
        target: Target,

        /// Combinaisons à évaluer (ex: "3,17,28,44,61,89"), répétable
        #[arg(short, long)]
        evaluate: Vec<String>,

        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Confronter les combinaisons perdantes à l'historique
    Outcomes {
        #[command(flatten)]
        target: Target,

        /// Nombre minimal de numéros communs (seuil du jeu par défaut)
        #[arg(short, long)]
        min_matches: Option<usize>,

        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// Produire les données statistiques destinées à un assistant IA
    AiPayload {
        #[command(flatten)]
        target: Target,

        /// Fournisseur IA (celui des réglages par défaut)
        #[arg(short, long, value_enum)]
        provider: Option<AiProvider>,

        /// Fichier de sortie (sortie standard par défaut)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Valider une réponse JSON d'assistant IA
    AiValidate {
        #[command(flatten)]
        target: Target,

        /// Fichier de réponse (entrée standard par défaut)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        provider: Option<AiProvider>,

        /// Enregistrer la combinaison acceptée
        #[arg(long)]
        save: bool,
    },

    /// Réglages
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum UnsuccessfulAction {
    /// Enregistrer une combinaison perdante
    Add {
        #[command(flatten)]
        target: Target,

        /// Numéros (ex: "3,17,28,44,61,89")
        numbers: String,

        #[arg(long)]
        jolly: Option<u8>,

        #[arg(long)]
        superstar: Option<u8>,

        /// Stratégie qui l'avait produite
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Lister les combinaisons perdantes
    List {
        #[arg(short, long, value_enum)]
        game: Option<Game>,
    },

    /// Supprimer une combinaison par identifiant
    Delete { id: Uuid },

    /// Tout supprimer (d'un jeu, ou de tous)
    Clear {
        #[arg(short, long, value_enum)]
        game: Option<Game>,

        /// Ne pas demander confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Afficher les réglages effectifs
    Show,
    /// Écrire les réglages par défaut
    Init,
    /// Choisir le fournisseur IA
    SetProvider {
        #[arg(value_enum)]
        provider: AiProvider,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Config { action } = &cli.command {
        return cmd_config(&cli.config, action);
    }

    let config = EngineConfig::load_or_default(&cli.config)?;
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { game, file } => cmd_import(&conn, Game::resolve(&game), &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { target, last } => cmd_list(&conn, &target, last),
        Command::Stats { target, window, top } => cmd_stats(&conn, &config, &target, window, top),
        Command::Generate {
            target,
            strategy,
            count,
            seed,
            save,
        } => cmd_generate(&conn, &config, &target, strategy, count, seed, save),
        Command::History { game, last } => {
            display_generated(&fetch_generated(&conn, game, last)?);
            Ok(())
        }
        Command::Unsuccessful { action } => cmd_unsuccessful(&conn, action),
        Command::Analyze { target, evaluate, top } => cmd_analyze(&conn, &config, &target, &evaluate, top),
        Command::Outcomes { target, min_matches, top } => cmd_outcomes(&conn, &target, min_matches, top),
        Command::AiPayload { target, provider, output } => {
            cmd_ai_payload(&conn, &config, &target, provider, output.as_deref())
        }
        Command::AiValidate {
            target,
            file,
            provider,
            save,
        } => cmd_ai_validate(&conn, &config, &target, file.as_deref(), provider, save),
        Command::Config { .. } => Ok(()),
    }
}

fn ensure_history(conn: &Connection, game: Game) -> Result<bool> {
    if count_draws(conn, game)? == 0 {
        println!("Aucun tirage {} en base. Lancez d'abord : lottolab import --game {}", game, game.id());
        return Ok(false);
    }
    Ok(true)
}

fn cmd_import(conn: &Connection, game: Game, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, game, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, target: &Target, last: u32) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    if !ensure_history(conn, game)? {
        return Ok(());
    }
    let draws = fetch_draws(conn, game, wheel.as_deref(), last)?;
    display_draws(game, &draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, config: &EngineConfig, target: &Target, window: Option<u32>, top: usize) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    if !ensure_history(conn, game)? {
        return Ok(());
    }
    let history = fetch_draws(conn, game, wheel.as_deref(), window.unwrap_or(u32::MAX))?;
    let unsuccessful = fetch_unsuccessful(conn, Some(game))?;
    let stats = GameStatistics::compute(game, wheel.as_deref(), &history, &unsuccessful, config);
    display_stats(&stats, top);
    Ok(())
}

fn cmd_generate(
    conn: &Connection,
    config: &EngineConfig,
    target: &Target,
    strategy: Strategy,
    count: usize,
    seed: Option<u64>,
    save: bool,
) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    let history = fetch_draws(conn, game, wheel.as_deref(), u32::MAX)?;
    let unsuccessful = fetch_unsuccessful(conn, Some(game))?;
    if history.is_empty() {
        tracing::warn!(game = %game, "historique vide, tirage uniforme");
    }

    let stats = GameStatistics::compute(game, wheel.as_deref(), &history, &unsuccessful, config);
    let advanced = (strategy == Strategy::Ai)
        .then(|| AdvancedStatistics::compute(game, wheel.as_deref(), &history, &unsuccessful, &[], config));

    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let generations: Vec<_> = (0..count)
        .map(|_| generate(game, strategy, &stats, advanced.as_ref(), config, &mut rng))
        .collect();
    display_generations(&generations);

    if save {
        for g in &generations {
            insert_generated(conn, &g.to_record(game, wheel.clone(), None))?;
        }
        println!("{} combinaison(s) enregistrée(s).", generations.len());
    }
    Ok(())
}

fn cmd_unsuccessful(conn: &Connection, action: UnsuccessfulAction) -> Result<()> {
    match action {
        UnsuccessfulAction::Add {
            target,
            numbers,
            jolly,
            superstar,
            strategy,
            note,
        } => {
            let (game, wheel) = target.resolve()?;
            let combo = UnsuccessfulCombination::new(game, wheel.as_deref(), parse_numbers(&numbers)?, jolly, superstar)?
                .with_strategy(strategy)
                .with_note(note);
            insert_unsuccessful(conn, &combo)?;
            println!("Combinaison enregistrée : {}", combo.id);
        }
        UnsuccessfulAction::List { game } => {
            display_unsuccessful(&fetch_unsuccessful(conn, game)?);
        }
        UnsuccessfulAction::Delete { id } => {
            if delete_unsuccessful(conn, &id)? {
                println!("Combinaison supprimée.");
            } else {
                println!("Aucune combinaison avec l'identifiant {}.", id);
            }
        }
        UnsuccessfulAction::Clear { game, yes } => {
            let scope = game.map(|g| g.to_string()).unwrap_or_else(|| "tous les jeux".into());
            if !yes {
                let confirm = prompt(&format!("Supprimer les combinaisons perdantes ({}) ? (o/n) : ", scope))?;
                if confirm.to_lowercase() != "o" {
                    println!("Suppression annulée.");
                    return Ok(());
                }
            }
            let removed = clear_unsuccessful(conn, game)?;
            println!("{} combinaison(s) supprimée(s).", removed);
        }
    }
    Ok(())
}

fn cmd_analyze(conn: &Connection, config: &EngineConfig, target: &Target, evaluate: &[String], top: usize) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    let combos = evaluate
        .iter()
        .map(|raw| -> Result<Vec<u8>> {
            let numbers = parse_numbers(raw)?;
            lottolab_db::models::validate_combination(game, &numbers)?;
            Ok(numbers)
        })
        .collect::<Result<Vec<_>>>()?;

    if !ensure_history(conn, game)? && combos.is_empty() {
        return Ok(());
    }
    let history = fetch_draws(conn, game, wheel.as_deref(), u32::MAX)?;
    let unsuccessful = fetch_unsuccessful(conn, Some(game))?;
    let advanced = AdvancedStatistics::compute(game, wheel.as_deref(), &history, &unsuccessful, &combos, config);
    display_advanced(&advanced, top);
    Ok(())
}

fn cmd_outcomes(conn: &Connection, target: &Target, min_matches: Option<usize>, top: usize) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    let history = fetch_draws(conn, game, wheel.as_deref(), u32::MAX)?;
    let unsuccessful = fetch_unsuccessful(conn, Some(game))?;
    let report = analyze_outcomes(&unsuccessful, &history, game, wheel.as_deref(), min_matches);
    display_outcomes(&report, top);
    Ok(())
}

fn cmd_ai_payload(
    conn: &Connection,
    config: &EngineConfig,
    target: &Target,
    provider: Option<AiProvider>,
    output: Option<&Path>,
) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    let config = config.clone().with_provider(provider.unwrap_or(config.provider));
    let history = fetch_draws(conn, game, wheel.as_deref(), u32::MAX)?;
    let unsuccessful = fetch_unsuccessful(conn, Some(game))?;

    let stats = GameStatistics::compute(game, wheel.as_deref(), &history, &unsuccessful, &config);
    let advanced = AdvancedStatistics::compute(game, wheel.as_deref(), &history, &unsuccessful, &[], &config);
    let json = serde_json::to_string_pretty(&build_payload(&stats, &advanced, &config))?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
            println!("Données écrites dans {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_ai_validate(
    conn: &Connection,
    config: &EngineConfig,
    target: &Target,
    file: Option<&Path>,
    provider: Option<AiProvider>,
    save: bool,
) -> Result<()> {
    let (game, wheel) = target.resolve()?;
    let raw = match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Impossible de lire {:?}", path))?,
        None => io::read_to_string(io::stdin()).context("Erreur de lecture")?,
    };

    let rec = match validate_response(&raw, game) {
        Ok(rec) => rec,
        Err(e) => bail!("Réponse IA rejetée : {}", e),
    };
    display_ai_recommendation(&rec);

    if save {
        let record = rec.to_record(game, wheel, provider.unwrap_or(config.provider));
        insert_generated(conn, &record)?;
        println!("Combinaison enregistrée : {}", record.id);
    }
    Ok(())
}

fn cmd_config(path: &Path, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = EngineConfig::load_or_default(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            if path.exists() {
                bail!("{} existe déjà", path.display());
            }
            EngineConfig::default().save(path)?;
            println!("Réglages écrits dans {}", path.display());
        }
        ConfigAction::SetProvider { provider } => {
            let config = EngineConfig::load_or_default(path)?.with_provider(*provider);
            config.save(path)?;
            println!("Fournisseur IA : {}", provider);
        }
    }
    Ok(())
}

/// Numéros séparés par des virgules ou des espaces.
fn parse_numbers(raw: &str) -> Result<Vec<u8>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("Numéro invalide : '{}'", s))
        })
        .collect()
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}
