use crate::models::Game;

/// Erreurs de forme sur une combinaison, un jeu ou une roue.
/// Les messages sont présentables tels quels à l'utilisateur.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Jeu inconnu : '{0}'")]
    UnknownGame(String),

    #[error("Roue inconnue : '{0}'")]
    UnknownWheel(String),

    #[error("Le jeu {0} exige une roue")]
    MissingWheel(Game),

    #[error("Le jeu {0} n'a pas de roues")]
    UnexpectedWheel(Game),

    #[error("Attendu {expected} numéros, reçu {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("Numéro {number} hors limites (1-{max})")]
    OutOfRange { number: u8, max: u8 },

    #[error("Numéro en double : {0}")]
    Duplicate(u8),

    #[error("Le jeu {game} n'accepte pas de {field}")]
    SecondaryNotSupported { game: Game, field: &'static str },

    #[error("{field} {number} hors limites (1-{max})")]
    SecondaryOutOfRange { field: &'static str, number: u8, max: u8 },

    #[error("Le jolly {0} figure déjà parmi les numéros")]
    JollyInMainNumbers(u8),
}
