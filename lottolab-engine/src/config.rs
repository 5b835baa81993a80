use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lottolab_db::models::AiProvider;

/// Poids du score d'influence. Seule la direction compte : la fréquence récente
/// tire le score vers le haut, la pénalité vers le bas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceWeights {
    pub historical: f64,
    pub recent: f64,
    pub penalty: f64,
}

impl Default for InfluenceWeights {
    fn default() -> Self {
        Self {
            historical: 0.4,
            recent: 0.6,
            penalty: 0.5,
        }
    }
}

/// Réglages heuristiques du générateur. Les probabilités d'évitement biaisent
/// le tirage sans jamais exclure définitivement un numéro.
///
/// La part fréquente est arrondie, la part en retard tronquée : il reste
/// toujours au moins une place au complément uniforme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub frequent_share: f64,
    pub delayed_share: f64,
    pub infrequent_share: f64,
    pub unlucky_number_skip: f64,
    pub unlucky_pair_skip: f64,
    pub high_variability_skip: f64,
    pub secondary_unlucky_skip: f64,
    pub max_fill_attempts: usize,
    pub secondary_retries: usize,
    /// Taille du vivier des retardataires, en multiple du nombre de numéros à choisir.
    pub delayed_pool_factor: usize,
    /// Taille du vivier IA (meilleures influences), en multiple du nombre de numéros.
    pub ai_candidate_factor: usize,
    pub ai_lift_pairs: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            frequent_share: 0.6,
            delayed_share: 0.3,
            infrequent_share: 0.4,
            unlucky_number_skip: 0.7,
            unlucky_pair_skip: 0.6,
            high_variability_skip: 0.4,
            secondary_unlucky_skip: 0.8,
            max_fill_attempts: 1000,
            secondary_retries: 10,
            delayed_pool_factor: 3,
            ai_candidate_factor: 2,
            ai_lift_pairs: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub provider: AiProvider,
    /// Fenêtre récente pour l'influence ; `None` = tout l'historique.
    pub recent_window: Option<usize>,
    pub min_cooccurrence: u32,
    pub min_unlucky_pair: u32,
    pub unlucky_threshold_pct: f64,
    pub influence: InfluenceWeights,
    pub generator: GeneratorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            recent_window: None,
            min_cooccurrence: 3,
            min_unlucky_pair: 3,
            unlucky_threshold_pct: 20.0,
            influence: InfluenceWeights::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_provider(mut self, provider: AiProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {:?}", path))?;
        let config: EngineConfig = serde_json::from_str(&json)
            .with_context(|| format!("Configuration invalide dans {:?}", path))?;
        Ok(config)
    }

    /// Charge la configuration si le fichier existe, sinon les valeurs par défaut.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "pas de fichier de configuration, valeurs par défaut");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire {:?}", path))?;
        Ok(())
    }
}
