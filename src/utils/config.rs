use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::utils::error::{NodeError, Result};

/// Upper bound for any day-based fraud window.
const MAX_DAYS: i64 = 36_500;

/// Which template family the deployment produces and compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    /// Face feature vectors from an injected extractor.
    Vector,
    /// Thresholded-raster digests. Exact match only.
    #[default]
    Hash,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub node: NodeConfig,
    pub matching: MatchingConfig,
    pub encoder: EncoderConfig,
    pub fraud: FraudConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub mode: MatchingMode,
    /// Biometric acceptance threshold for vector templates (distance 0.6 ~ 85%).
    pub vector_threshold: f64,
    /// Biometric acceptance threshold for hash templates.
    pub hash_threshold: f64,
    /// Per-factor name similarity needed for a name hit.
    pub name_threshold: f64,
    /// Fused duplicate score needed before an alert is raised at registration.
    pub alert_threshold: f64,
    /// Confidence reported for an exact fingerprint match.
    pub fingerprint_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Side length of the grayscale raster used by the hash fallback.
    pub raster_size: u32,
    pub max_payload_bytes: usize,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudConfig {
    pub ghost_days: i64,
    pub claim_window_hours: f64,
    /// Check-ins strictly before this hour are unusual.
    pub early_hour: u32,
    pub low_confidence: f64,
    /// Days after registration before missing attendance counts as risk.
    pub grace_days: i64,
    /// Claim counts above this add risk.
    pub max_claims: usize,
    pub weights: RiskWeights,
    pub levels: RiskLevelThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub pending_duplicate: u32,
    pub no_attendance: u32,
    pub unverified_claims: u32,
    pub excess_claims: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLevelThresholds {
    pub medium: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "ghostguard".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            mode: MatchingMode::Hash,
            vector_threshold: 85.0,
            hash_threshold: 99.0,
            name_threshold: 80.0,
            alert_threshold: 80.0,
            fingerprint_confidence: 95.0,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            raster_size: 64,
            max_payload_bytes: 10_485_760, // 10MB
            timeout_ms: 5_000,
        }
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            ghost_days: 30,
            claim_window_hours: 24.0,
            early_hour: 5,
            low_confidence: 70.0,
            grace_days: 7,
            max_claims: 5,
            weights: RiskWeights::default(),
            levels: RiskLevelThresholds::default(),
        }
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            pending_duplicate: 40,
            no_attendance: 30,
            unverified_claims: 20,
            excess_claims: 10,
        }
    }
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 20,
            high: 40,
            critical: 70,
        }
    }
}

impl MatchingConfig {
    /// Biometric threshold for the active mode.
    pub fn biometric_threshold(&self) -> f64 {
        match self.mode {
            MatchingMode::Vector => self.vector_threshold,
            MatchingMode::Hash => self.hash_threshold,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        let config = ConfigLib::builder()
            // Load from config file
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (e.g., APP_MATCHING__MODE)
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = ConfigLib::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        for (name, value) in [
            ("vector_threshold", m.vector_threshold),
            ("hash_threshold", m.hash_threshold),
            ("name_threshold", m.name_threshold),
            ("alert_threshold", m.alert_threshold),
            ("fingerprint_confidence", m.fingerprint_confidence),
            ("low_confidence", self.fraud.low_confidence),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(NodeError::Config(format!(
                    "{} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }

        if self.encoder.raster_size == 0 {
            return Err(NodeError::Config("raster_size must be greater than 0".into()));
        }
        if self.encoder.max_payload_bytes == 0 {
            return Err(NodeError::Config("max_payload_bytes must be greater than 0".into()));
        }

        for (name, days) in [
            ("ghost_days", self.fraud.ghost_days),
            ("grace_days", self.fraud.grace_days),
        ] {
            if !(0..=MAX_DAYS).contains(&days) {
                return Err(NodeError::Config(format!(
                    "{} must be within 0..={}, got {}",
                    name, MAX_DAYS, days
                )));
            }
        }
        if self.fraud.claim_window_hours <= 0.0 {
            return Err(NodeError::Config("claim_window_hours must be greater than 0".into()));
        }
        if self.fraud.early_hour > 24 {
            return Err(NodeError::Config("early_hour must be within 0..=24".into()));
        }

        let w = &self.fraud.weights;
        for (name, weight) in [
            ("pending_duplicate", w.pending_duplicate),
            ("no_attendance", w.no_attendance),
            ("unverified_claims", w.unverified_claims),
            ("excess_claims", w.excess_claims),
        ] {
            if weight > 100 {
                return Err(NodeError::Config(format!(
                    "risk weight {} must be within 0..=100, got {}",
                    name, weight
                )));
            }
        }

        let levels = &self.fraud.levels;
        if !(levels.medium <= levels.high && levels.high <= levels.critical) {
            return Err(NodeError::Config(
                "risk level cutoffs must satisfy medium <= high <= critical".into(),
            ));
        }

        Ok(())
    }

    pub fn get_encode_timeout(&self) -> Duration {
        Duration::from_millis(self.encoder.timeout_ms)
    }
}

impl From<ConfigError> for NodeError {
    fn from(error: ConfigError) -> Self {
        NodeError::Config(error.to_string())
    }
}
