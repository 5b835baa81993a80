use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const LOTTO_WHEELS: [&str; 11] = [
    "Bari", "Cagliari", "Firenze", "Genova", "Milano", "Napoli",
    "Palermo", "Roma", "Torino", "Venezia", "Nazionale",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    #[value(name = "superenalotto")]
    SuperEnalotto,
    Lotto,
    #[value(name = "10elotto")]
    #[serde(rename = "10elotto")]
    DiecieLotto,
}

impl Game {
    pub const ALL: [Game; 3] = [Game::SuperEnalotto, Game::Lotto, Game::DiecieLotto];

    pub fn id(&self) -> &'static str {
        match self {
            Game::SuperEnalotto => "superenalotto",
            Game::Lotto => "lotto",
            Game::DiecieLotto => "10elotto",
        }
    }

    pub fn numbers_to_select(&self) -> usize {
        match self {
            Game::SuperEnalotto => 6,
            Game::Lotto => 5,
            Game::DiecieLotto => 10,
        }
    }

    pub fn max_number(&self) -> u8 {
        90
    }

    pub fn has_jolly(&self) -> bool {
        matches!(self, Game::SuperEnalotto)
    }

    pub fn has_superstar(&self) -> bool {
        matches!(self, Game::SuperEnalotto)
    }

    pub fn wheels(&self) -> &'static [&'static str] {
        match self {
            Game::Lotto => &LOTTO_WHEELS,
            _ => &[],
        }
    }

    /// Nombre de numéros communs à partir duquel une combinaison perdante
    /// est considérée comme « passée près ».
    pub fn near_miss_threshold(&self) -> usize {
        match self {
            Game::SuperEnalotto => 4,
            Game::Lotto => 3,
            Game::DiecieLotto => 5,
        }
    }

    pub fn from_id(id: &str) -> Option<Game> {
        let id = id.trim().to_lowercase();
        Game::ALL.into_iter().find(|g| g.id() == id)
    }

    /// Résout un identifiant de jeu, avec repli sur SuperEnalotto si inconnu.
    /// Sert à l'argument `--game` de l'import ; les chemins qui doivent être
    /// exacts utilisent `from_id`.
    pub fn resolve(id: &str) -> Game {
        match Game::from_id(id) {
            Some(game) => game,
            None => {
                tracing::warn!(id, "jeu inconnu, repli sur superenalotto");
                Game::SuperEnalotto
            }
        }
    }

    pub fn config(&self) -> GameConfig {
        GameConfig {
            id: self.id().to_string(),
            numbers_to_select: self.numbers_to_select(),
            max_number: self.max_number(),
            wheels: self.wheels().iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Normalise la roue demandée : obligatoire pour le Lotto, interdite ailleurs.
    pub fn validate_wheel(&self, wheel: Option<&str>) -> Result<Option<String>, ValidationError> {
        match (self.wheels().is_empty(), wheel) {
            (true, None) => Ok(None),
            (true, Some(_)) => Err(ValidationError::UnexpectedWheel(*self)),
            (false, None) => Err(ValidationError::MissingWheel(*self)),
            (false, Some(w)) => self
                .wheels()
                .iter()
                .find(|known| known.eq_ignore_ascii_case(w.trim()))
                .map(|known| Some(known.to_string()))
                .ok_or_else(|| ValidationError::UnknownWheel(w.to_string())),
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Game::SuperEnalotto => write!(f, "SuperEnalotto"),
            Game::Lotto => write!(f, "Lotto"),
            Game::DiecieLotto => write!(f, "10eLotto"),
        }
    }
}

impl FromStr for Game {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Game::from_id(s).ok_or_else(|| ValidationError::UnknownGame(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub id: String,
    pub numbers_to_select: usize,
    pub max_number: u8,
    pub wheels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Standard,
    HighVariability,
    Ai,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Standard => "standard",
            Strategy::HighVariability => "high-variability",
            Strategy::Ai => "ai",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Strategy::Standard),
            "high-variability" => Ok(Strategy::HighVariability),
            "ai" => Ok(Strategy::Ai),
            other => anyhow::bail!("Stratégie inconnue : '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Anthropic,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(AiProvider::OpenAi),
            "anthropic" => Ok(AiProvider::Anthropic),
            other => anyhow::bail!("Fournisseur IA inconnu : '{}'", other),
        }
    }
}

/// Un tirage historique. `numbers` porte les numéros principaux ; pour le Lotto,
/// `wheels` porte le détail par roue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub date: String,
    pub numbers: Vec<u8>,
    pub jolly: Option<u8>,
    pub superstar: Option<u8>,
    #[serde(default)]
    pub wheels: BTreeMap<String, Vec<u8>>,
}

impl DrawRecord {
    pub fn new(date: impl Into<String>, numbers: Vec<u8>) -> Self {
        Self {
            date: date.into(),
            numbers,
            jolly: None,
            superstar: None,
            wheels: BTreeMap::new(),
        }
    }

    pub fn numbers_for(&self, wheel: Option<&str>) -> &[u8] {
        match wheel.and_then(|w| self.wheels.get(w)) {
            Some(numbers) => numbers,
            None => &self.numbers,
        }
    }
}

/// Extrait les numéros d'un historique pour une roue donnée, en ignorant
/// les tirages qui n'ont rien pour cette roue.
pub fn draw_numbers<'a>(history: &'a [DrawRecord], wheel: Option<&str>) -> Vec<&'a [u8]> {
    history
        .iter()
        .map(|d| d.numbers_for(wheel))
        .filter(|n| !n.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsuccessfulCombination {
    pub id: Uuid,
    pub game: Game,
    pub wheel: Option<String>,
    pub numbers: Vec<u8>,
    pub jolly: Option<u8>,
    pub superstar: Option<u8>,
    pub strategy: Option<Strategy>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UnsuccessfulCombination {
    pub fn new(
        game: Game,
        wheel: Option<&str>,
        mut numbers: Vec<u8>,
        jolly: Option<u8>,
        superstar: Option<u8>,
    ) -> Result<Self, ValidationError> {
        let wheel = game.validate_wheel(wheel)?;
        validate_combination(game, &numbers)?;
        validate_secondary(game, &numbers, jolly, superstar)?;
        numbers.sort_unstable();
        Ok(Self {
            id: Uuid::new_v4(),
            game,
            wheel,
            numbers,
            jolly,
            superstar,
            strategy: None,
            note: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_strategy(mut self, strategy: Option<Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn matches(&self, game: Game, wheel: Option<&str>) -> bool {
        self.game == game && self.wheel.as_deref() == wheel
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCombination {
    pub id: Uuid,
    pub game: Game,
    pub wheel: Option<String>,
    pub numbers: Vec<u8>,
    pub jolly: Option<u8>,
    pub superstar: Option<u8>,
    pub strategy: Strategy,
    pub is_ai: bool,
    pub ai_provider: Option<AiProvider>,
    pub created_at: DateTime<Utc>,
}

impl GeneratedCombination {
    pub fn new(
        game: Game,
        wheel: Option<String>,
        numbers: Vec<u8>,
        jolly: Option<u8>,
        superstar: Option<u8>,
        strategy: Strategy,
        ai_provider: Option<AiProvider>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game,
            wheel,
            numbers,
            jolly,
            superstar,
            strategy,
            is_ai: strategy == Strategy::Ai || ai_provider.is_some(),
            ai_provider,
            created_at: Utc::now(),
        }
    }
}

pub fn validate_combination(game: Game, numbers: &[u8]) -> Result<(), ValidationError> {
    let expected = game.numbers_to_select();
    if numbers.len() != expected {
        return Err(ValidationError::WrongCount { expected, actual: numbers.len() });
    }
    let max = game.max_number();
    for &n in numbers {
        if n < 1 || n > max {
            return Err(ValidationError::OutOfRange { number: n, max });
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(ValidationError::Duplicate(numbers[i]));
            }
        }
    }
    Ok(())
}

pub fn validate_secondary(
    game: Game,
    numbers: &[u8],
    jolly: Option<u8>,
    superstar: Option<u8>,
) -> Result<(), ValidationError> {
    let max = game.max_number();
    if let Some(j) = jolly {
        if !game.has_jolly() {
            return Err(ValidationError::SecondaryNotSupported { game, field: "jolly" });
        }
        if j < 1 || j > max {
            return Err(ValidationError::SecondaryOutOfRange { field: "Jolly", number: j, max });
        }
        if numbers.contains(&j) {
            return Err(ValidationError::JollyInMainNumbers(j));
        }
    }
    if let Some(s) = superstar {
        if !game.has_superstar() {
            return Err(ValidationError::SecondaryNotSupported { game, field: "superstar" });
        }
        if s < 1 || s > max {
            return Err(ValidationError::SecondaryOutOfRange { field: "Superstar", number: s, max });
        }
    }
    Ok(())
}

/// Valide un tirage complet, roue par roue pour le Lotto.
pub fn validate_draw(game: Game, draw: &DrawRecord) -> Result<(), ValidationError> {
    if game.wheels().is_empty() {
        validate_combination(game, &draw.numbers)?;
        return validate_secondary(game, &draw.numbers, draw.jolly, draw.superstar);
    }
    if draw.wheels.is_empty() {
        return Err(ValidationError::MissingWheel(game));
    }
    for (wheel, numbers) in &draw.wheels {
        game.validate_wheel(Some(wheel))?;
        validate_combination(game, numbers)?;
    }
    Ok(())
}
