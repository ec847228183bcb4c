use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::risk::RiskEngine;
use crate::store::VehicleStore;
use crate::summary::{AlgorithmicGenerator, RemoteGenerator, SummaryGenerator};
use crate::types::{DatabaseStatistics, GenerationSource, RiskAssessment, VehicleRecord};

/// Per-request pipeline: validate VIN shape → store lookup → scoring →
/// summary generation (remote once, then fallback) → assembled assessment.
/// Stateless between requests; shares only the read-only store.
pub struct VinAnalyzer {
    store: Arc<VehicleStore>,
    engine: RiskEngine,
    /// Primary generator. None means remote generation is disabled and
    /// every request goes straight to the algorithmic path.
    remote: Option<Box<dyn SummaryGenerator>>,
    fallback: AlgorithmicGenerator,
}

impl VinAnalyzer {
    pub fn new(store: Arc<VehicleStore>, remote: Option<Box<dyn SummaryGenerator>>) -> Self {
        Self {
            store,
            engine: RiskEngine::new(),
            remote,
            fallback: AlgorithmicGenerator::new(),
        }
    }

    /// Wire up from configuration. Remote generation requires both the
    /// USE_LLM toggle and an API key; a missing key downgrades to
    /// algorithmic-only at startup rather than failing every request.
    pub fn from_config(cfg: &Config, store: Arc<VehicleStore>) -> Result<Self> {
        let remote: Option<Box<dyn SummaryGenerator>> = if cfg.use_llm {
            match &cfg.anthropic_api_key {
                Some(key) => {
                    info!(model = %cfg.llm_model, timeout_secs = cfg.llm_timeout_secs,
                        "remote summary generation enabled");
                    Some(Box::new(RemoteGenerator::new(
                        &cfg.anthropic_api_url,
                        key,
                        &cfg.llm_model,
                        Duration::from_secs(cfg.llm_timeout_secs),
                    )?))
                }
                None => {
                    warn!("USE_LLM is set but ANTHROPIC_API_KEY is missing; using algorithmic generation only");
                    None
                }
            }
        } else {
            info!("remote summary generation disabled by configuration");
            None
        };

        Ok(Self::new(store, remote))
    }

    #[cfg(test)]
    pub fn with_engine(mut self, engine: RiskEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Full analysis for one VIN.
    pub async fn analyze(&self, vin: &str) -> Result<RiskAssessment> {
        let vin = normalize_vin(vin)?;
        let record = self
            .store
            .lookup(&vin)
            .ok_or_else(|| AppError::VinNotFound(vin.clone()))?;

        let (score, factors) = self.engine.assess(record);

        // At most one remote attempt; any failure downgrades silently to
        // the algorithmic path and is only visible in the logs.
        let (text, source) = match &self.remote {
            Some(remote) => match remote.generate(record, score, &factors).await {
                Ok(text) => (text, GenerationSource::Remote),
                Err(e) => {
                    warn!(vin = %vin, error = %e,
                        "remote generation failed; downgraded to algorithmic");
                    (self.fallback.render(record, score, &factors), GenerationSource::Algorithmic)
                }
            },
            None => (self.fallback.render(record, score, &factors), GenerationSource::Algorithmic),
        };

        Ok(RiskAssessment {
            vin,
            risk_score: score,
            factors,
            summary: text.summary,
            reasoning: text.reasoning,
            source,
        })
    }

    /// Raw record retrieval with the same VIN validation as `analyze`.
    pub fn vehicle(&self, vin: &str) -> Result<VehicleRecord> {
        let vin = normalize_vin(vin)?;
        self.store
            .lookup(&vin)
            .cloned()
            .ok_or(AppError::VinNotFound(vin))
    }

    /// Shape-validated existence check, no record retrieval.
    pub fn vin_exists(&self, vin: &str) -> Result<bool> {
        let vin = normalize_vin(vin)?;
        Ok(self.store.exists(&vin))
    }

    pub fn stats(&self) -> &DatabaseStatistics {
        self.store.statistics()
    }
}

/// Trim, uppercase, and validate VIN shape: exactly 17 characters from
/// [A-HJ-NPR-Z0-9] (I, O, Q are excluded by VIN convention).
pub fn normalize_vin(vin: &str) -> Result<String> {
    let vin = vin.trim().to_uppercase();
    let valid = vin.len() == 17
        && vin
            .chars()
            .all(|c| matches!(c, 'A'..='Z' | '0'..='9') && !matches!(c, 'I' | 'O' | 'Q'));
    if valid {
        Ok(vin)
    } else {
        Err(AppError::MalformedVin(vin))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
