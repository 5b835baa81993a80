use lottolab_db::models::Game;

/// Rejet d'une réponse d'assistant IA. Une réponse invalide n'est jamais corrigée.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AiResponseError {
    #[error("JSON invalide : {0}")]
    MalformedJson(String),

    #[error("La réponse doit être un objet JSON")]
    NotAnObject,

    #[error("Champ « numbers » absent")]
    MissingNumbers,

    #[error("Le champ « numbers » doit être un tableau")]
    NumbersNotArray,

    #[error("Numéro non entier : {0}")]
    NonIntegerNumber(String),

    #[error("{expected} numéros attendus, {actual} reçus")]
    WrongCount { expected: usize, actual: usize },

    #[error("Numéro {number} hors plage [1, {max}]")]
    OutOfRange { number: i64, max: u8 },

    #[error("Numéro {0} en double")]
    Duplicate(u8),

    #[error("Jolly invalide : {0}")]
    InvalidJolly(String),

    #[error("Superstar invalide : {0}")]
    InvalidSuperstar(String),

    #[error("Le jeu {game} n'a pas de {field}")]
    SecondaryNotSupported { game: Game, field: &'static str },

    #[error("Champ « reasons » absent ou non tableau")]
    MissingReasons,

    #[error("Justification n°{0} non textuelle")]
    ReasonNotString(usize),

    #[error("Champ « confidence » absent")]
    MissingConfidence,

    #[error("Le champ « confidence » doit être numérique")]
    NonNumericConfidence,

    #[error("Confiance {0} hors de [0, 100]")]
    ConfidenceOutOfRange(f64),

    #[error("Le champ « analysis » doit être un objet")]
    AnalysisNotObject,
}
