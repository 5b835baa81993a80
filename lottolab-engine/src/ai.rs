use serde::Serialize;
use serde_json::{Map, Value};

use lottolab_db::models::{AiProvider, Game, GameConfig, GeneratedCombination, Strategy};

use crate::advanced::AdvancedStatistics;
use crate::config::EngineConfig;
use crate::cooccurrence::CoOccurrence;
use crate::distribution::OptimalDistribution;
use crate::error::AiResponseError;
use crate::frequency::{DelayRecord, Frequency, GameStatistics, UnluckyPair};
use crate::influence::{top_influence, InfluenceRecord};

const TOP_NUMBERS: usize = 15;
const TOP_UNLUCKY: usize = 10;
const TOP_INFLUENCE: usize = 20;
const TOP_PAIRS: usize = 10;

/// Données statistiques transmises à un assistant IA externe.
#[derive(Debug, Clone, Serialize)]
pub struct AiPayload {
    pub provider: AiProvider,
    pub game: GameConfig,
    pub wheel: Option<String>,
    pub total_draws: usize,
    pub frequent: Vec<Frequency>,
    pub delayed: Vec<DelayRecord>,
    pub unlucky_numbers: Vec<Frequency>,
    pub unlucky_pairs: Vec<UnluckyPair>,
    pub influence: Vec<InfluenceRecord>,
    pub top_pairs: Vec<CoOccurrence>,
    pub optimal: OptimalDistribution,
    pub instructions: String,
}

fn instructions(game: Game) -> String {
    let mut secondary = String::new();
    if game.has_jolly() {
        secondary.push_str(", un jolly distinct des numéros principaux");
    }
    if game.has_superstar() {
        secondary.push_str(", un superstar");
    }
    format!(
        "Propose {} numéros uniques entre 1 et {}{}. \
         Réponds uniquement par un objet JSON de la forme \
         {{\"numbers\": [..], \"jolly\": n|null, \"superstar\": n|null, \
         \"reasons\": [\"..\"], \"confidence\": 0-100, \"analysis\": {{..}}}}. \
         Les scores fournis sont des classements, pas des chances de gain.",
        game.numbers_to_select(),
        game.max_number(),
        secondary
    )
}

pub fn build_payload(stats: &GameStatistics, advanced: &AdvancedStatistics, config: &EngineConfig) -> AiPayload {
    let game = stats.game;
    AiPayload {
        provider: config.provider,
        game: game.config(),
        wheel: stats.wheel.clone(),
        total_draws: stats.total_draws,
        frequent: stats.frequent.iter().take(TOP_NUMBERS).cloned().collect(),
        delayed: stats.delayed.iter().take(TOP_NUMBERS).cloned().collect(),
        unlucky_numbers: stats.unlucky_numbers.iter().take(TOP_UNLUCKY).cloned().collect(),
        unlucky_pairs: stats.unlucky_pairs.iter().take(TOP_UNLUCKY).cloned().collect(),
        influence: top_influence(&advanced.influence, TOP_INFLUENCE)
            .into_iter()
            .cloned()
            .collect(),
        top_pairs: advanced.positive_pairs().take(TOP_PAIRS).cloned().collect(),
        optimal: advanced.optimal.clone(),
        instructions: instructions(game),
    }
}

/// Réponse IA acceptée après validation complète.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiRecommendation {
    pub numbers: Vec<u8>,
    pub jolly: Option<u8>,
    pub superstar: Option<u8>,
    pub reasons: Vec<String>,
    pub confidence: f64,
    pub analysis: Value,
}

impl AiRecommendation {
    pub fn to_record(&self, game: Game, wheel: Option<String>, provider: AiProvider) -> GeneratedCombination {
        let mut numbers = self.numbers.clone();
        numbers.sort_unstable();
        GeneratedCombination::new(
            game,
            wheel,
            numbers,
            self.jolly,
            self.superstar,
            Strategy::Ai,
            Some(provider),
        )
    }
}

fn in_range(n: i64, max: u8) -> bool {
    n >= 1 && n <= max as i64
}

fn parse_numbers(obj: &Map<String, Value>, game: Game) -> Result<Vec<u8>, AiResponseError> {
    let values = obj
        .get("numbers")
        .ok_or(AiResponseError::MissingNumbers)?
        .as_array()
        .ok_or(AiResponseError::NumbersNotArray)?;

    let raw: Vec<i64> = values
        .iter()
        .map(|v| v.as_i64().ok_or_else(|| AiResponseError::NonIntegerNumber(v.to_string())))
        .collect::<Result<_, _>>()?;

    let expected = game.numbers_to_select();
    if raw.len() != expected {
        return Err(AiResponseError::WrongCount { expected, actual: raw.len() });
    }

    let max = game.max_number();
    let mut numbers = Vec::with_capacity(raw.len());
    for n in raw {
        if !in_range(n, max) {
            return Err(AiResponseError::OutOfRange { number: n, max });
        }
        let n = n as u8;
        if numbers.contains(&n) {
            return Err(AiResponseError::Duplicate(n));
        }
        numbers.push(n);
    }
    Ok(numbers)
}

/// Lit un numéro secondaire facultatif. `null` et absence sont équivalents.
fn parse_secondary(
    obj: &Map<String, Value>,
    field: &'static str,
    game: Game,
    supported: bool,
    invalid: fn(String) -> AiResponseError,
) -> Result<Option<u8>, AiResponseError> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    if !supported {
        return Err(AiResponseError::SecondaryNotSupported { game, field });
    }
    match value.as_i64() {
        Some(n) if in_range(n, game.max_number()) => Ok(Some(n as u8)),
        _ => Err(invalid(value.to_string())),
    }
}

fn parse_reasons(obj: &Map<String, Value>) -> Result<Vec<String>, AiResponseError> {
    let values = obj
        .get("reasons")
        .and_then(Value::as_array)
        .ok_or(AiResponseError::MissingReasons)?;
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_string)
                .ok_or(AiResponseError::ReasonNotString(i))
        })
        .collect()
}

fn parse_confidence(obj: &Map<String, Value>) -> Result<f64, AiResponseError> {
    let value = match obj.get("confidence") {
        None | Some(Value::Null) => return Err(AiResponseError::MissingConfidence),
        Some(value) => value,
    };
    let confidence = value.as_f64().ok_or(AiResponseError::NonNumericConfidence)?;
    if !(0.0..=100.0).contains(&confidence) {
        return Err(AiResponseError::ConfidenceOutOfRange(confidence));
    }
    Ok(confidence)
}

/// Valide une réponse JSON brute d'un assistant IA.
///
/// Chaque champ fautif produit une erreur distincte ; rien n'est corrigé.
pub fn validate_response(raw: &str, game: Game) -> Result<AiRecommendation, AiResponseError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| AiResponseError::MalformedJson(e.to_string()))?;
    let obj = value.as_object().ok_or(AiResponseError::NotAnObject)?;

    let numbers = parse_numbers(obj, game)?;

    let jolly = parse_secondary(obj, "jolly", game, game.has_jolly(), AiResponseError::InvalidJolly)?;
    if let Some(j) = jolly {
        if numbers.contains(&j) {
            return Err(AiResponseError::InvalidJolly(j.to_string()));
        }
    }
    let superstar = parse_secondary(obj, "superstar", game, game.has_superstar(), AiResponseError::InvalidSuperstar)?;

    let reasons = parse_reasons(obj)?;
    let confidence = parse_confidence(obj)?;

    let analysis = match obj.get("analysis") {
        None | Some(Value::Null) => Value::Null,
        Some(value @ Value::Object(_)) => value.clone(),
        Some(_) => return Err(AiResponseError::AnalysisNotObject),
    };

    tracing::debug!(?numbers, confidence, "réponse IA acceptée");

    Ok(AiRecommendation {
        numbers,
        jolly,
        superstar,
        reasons,
        confidence,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottolab_db::models::DrawRecord;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "numbers": [3, 17, 28, 44, 61, 89],
            "jolly": 12,
            "superstar": 17,
            "reasons": ["3 : rang d'influence élevé", "17 : souvent avec 44"],
            "confidence": 62.5,
            "analysis": {"tendance": "équilibrée"}
        })
    }

    fn check(value: Value) -> Result<AiRecommendation, AiResponseError> {
        validate_response(&value.to_string(), Game::SuperEnalotto)
    }

    fn with(field: &str, replacement: Value) -> Value {
        let mut value = valid();
        value[field] = replacement;
        value
    }

    fn without(field: &str) -> Value {
        let mut value = valid();
        value.as_object_mut().unwrap().remove(field);
        value
    }

    #[test]
    fn test_well_formed_response_passes() {
        let rec = check(valid()).unwrap();
        assert_eq!(rec.numbers, vec![3, 17, 28, 44, 61, 89]);
        assert_eq!(rec.jolly, Some(12));
        assert_eq!(rec.superstar, Some(17));
        assert_eq!(rec.reasons.len(), 2);
        assert!((rec.confidence - 62.5).abs() < 1e-10);
        assert!(rec.analysis.is_object());
    }

    #[test]
    fn test_lotto_response_without_secondary() {
        let raw = json!({"numbers": [1, 2, 3, 4, 5], "reasons": [], "confidence": 0});
        let rec = validate_response(&raw.to_string(), Game::Lotto).unwrap();
        assert_eq!(rec.jolly, None);
        assert_eq!(rec.analysis, Value::Null);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            validate_response("{\"numbers\": [1, 2", Game::SuperEnalotto),
            Err(AiResponseError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(check(json!([1, 2, 3])), Err(AiResponseError::NotAnObject));
    }

    #[test]
    fn test_numbers_errors() {
        assert_eq!(check(without("numbers")), Err(AiResponseError::MissingNumbers));
        assert_eq!(check(with("numbers", json!("1,2,3"))), Err(AiResponseError::NumbersNotArray));
        assert!(matches!(
            check(with("numbers", json!([3, 17, "28", 44, 61, 89]))),
            Err(AiResponseError::NonIntegerNumber(_))
        ));
        assert!(matches!(
            check(with("numbers", json!([3, 17, 28.5, 44, 61, 89]))),
            Err(AiResponseError::NonIntegerNumber(_))
        ));
        assert_eq!(
            check(with("numbers", json!([3, 17, 28, 44, 61]))),
            Err(AiResponseError::WrongCount { expected: 6, actual: 5 })
        );
        assert_eq!(
            check(with("numbers", json!([3, 17, 28, 44, 61, 91]))),
            Err(AiResponseError::OutOfRange { number: 91, max: 90 })
        );
        assert_eq!(
            check(with("numbers", json!([0, 17, 28, 44, 61, 89]))),
            Err(AiResponseError::OutOfRange { number: 0, max: 90 })
        );
        assert_eq!(
            check(with("numbers", json!([3, 17, 28, 44, 61, 17]))),
            Err(AiResponseError::Duplicate(17))
        );
    }

    #[test]
    fn test_secondary_errors() {
        assert!(matches!(check(with("jolly", json!(95))), Err(AiResponseError::InvalidJolly(_))));
        assert!(matches!(check(with("jolly", json!(3))), Err(AiResponseError::InvalidJolly(_))));
        assert!(matches!(check(with("jolly", json!("x"))), Err(AiResponseError::InvalidJolly(_))));
        assert!(matches!(check(with("superstar", json!(0))), Err(AiResponseError::InvalidSuperstar(_))));
        assert!(check(with("jolly", Value::Null)).is_ok());

        let raw = json!({"numbers": [1, 2, 3, 4, 5], "jolly": 7, "reasons": [], "confidence": 10});
        assert_eq!(
            validate_response(&raw.to_string(), Game::Lotto),
            Err(AiResponseError::SecondaryNotSupported { game: Game::Lotto, field: "jolly" })
        );
    }

    #[test]
    fn test_reasons_errors() {
        assert_eq!(check(without("reasons")), Err(AiResponseError::MissingReasons));
        assert_eq!(check(with("reasons", json!("texte"))), Err(AiResponseError::MissingReasons));
        assert_eq!(check(with("reasons", json!(["ok", 4]))), Err(AiResponseError::ReasonNotString(1)));
    }

    #[test]
    fn test_confidence_errors() {
        assert_eq!(check(without("confidence")), Err(AiResponseError::MissingConfidence));
        assert_eq!(check(with("confidence", json!("80"))), Err(AiResponseError::NonNumericConfidence));
        assert_eq!(check(with("confidence", json!(101))), Err(AiResponseError::ConfidenceOutOfRange(101.0)));
        assert_eq!(check(with("confidence", json!(-1))), Err(AiResponseError::ConfidenceOutOfRange(-1.0)));
    }

    #[test]
    fn test_analysis_not_object() {
        assert_eq!(check(with("analysis", json!("rien"))), Err(AiResponseError::AnalysisNotObject));
        assert!(check(without("analysis")).is_ok());
    }

    #[test]
    fn test_to_record() {
        let rec = check(with("numbers", json!([89, 3, 17, 28, 44, 61]))).unwrap();
        let record = rec.to_record(Game::SuperEnalotto, None, AiProvider::Anthropic);
        assert_eq!(record.numbers, vec![3, 17, 28, 44, 61, 89]);
        assert!(record.is_ai);
        assert_eq!(record.ai_provider, Some(AiProvider::Anthropic));
    }

    #[test]
    fn test_build_payload() {
        let history: Vec<DrawRecord> = (0..10u8)
            .map(|i| DrawRecord::new(format!("2024-04-{:02}", i + 1), vec![1, 2, 3, 10 + i, 30 + i, 60 + i]))
            .collect();
        let config = EngineConfig::default().with_provider(AiProvider::Anthropic);
        let stats = GameStatistics::compute(Game::SuperEnalotto, None, &history, &[], &config);
        let advanced = AdvancedStatistics::compute(Game::SuperEnalotto, None, &history, &[], &[], &config);

        let payload = build_payload(&stats, &advanced, &config);
        assert_eq!(payload.provider, AiProvider::Anthropic);
        assert_eq!(payload.game.numbers_to_select, 6);
        assert_eq!(payload.total_draws, 10);
        assert_eq!(payload.frequent.len(), TOP_NUMBERS);
        assert_eq!(payload.influence.len(), TOP_INFLUENCE);
        assert!(payload.instructions.contains("jolly"));
        assert!(!payload.instructions.to_lowercase().contains("probab"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["provider"], "anthropic");
        assert!(json["influence"].as_array().is_some());
    }
}
