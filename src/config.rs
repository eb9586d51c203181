//! Engine configuration, loaded from an optional JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::codec::OutputFormat;
use crate::error::{GameError, Result};
use crate::ranges::{FrequencyRange, RangeCatalog};

/// Env var naming a config file.
pub const CONFIG_ENV: &str = "EQ_TRAINER_CONFIG";

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "eq-trainer.json";

/// Fixed parameters of the boost applied to every round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqSettings {
    pub q: f64,
    pub gain_db: f64,
}

impl Default for EqSettings {
    fn default() -> Self {
        Self {
            q: 1.5,
            gain_db: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory scanned for source sounds.
    pub sounds_dir: PathBuf,
    pub listen_addr: String,
    pub eq: EqSettings,
    pub output_format: OutputFormat,
    /// Highest allowed center frequency as a fraction of Nyquist.
    pub filter_ceiling_ratio: f64,
    /// Lowest allowed center frequency.
    pub min_center_hz: f64,
    pub ranges: Vec<FrequencyRange>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sounds_dir: PathBuf::from("sounds"),
            listen_addr: "127.0.0.1:5000".to_string(),
            eq: EqSettings::default(),
            output_format: OutputFormat::default(),
            filter_ceiling_ratio: 0.9,
            min_center_hz: 20.0,
            ranges: RangeCatalog::default().as_slice().to_vec(),
        }
    }
}

impl EngineConfig {
    /// Resolve the config: explicit path, then `EQ_TRAINER_CONFIG`, then
    /// `eq-trainer.json` in the working directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            return Self::load_from_path(Path::new(&p));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_path(&local);
        }
        info!("No config file found, using defaults");
        let cfg = Self::default();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            GameError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        let cfg = Self::from_json(&raw)?;
        info!("Loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(raw)
            .map_err(|e| GameError::InvalidConfig(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.eq.q.is_finite() && self.eq.q > 0.0) {
            return Err(GameError::InvalidConfig(format!("eq.q must be > 0, got {}", self.eq.q)));
        }
        if !self.eq.gain_db.is_finite() {
            return Err(GameError::InvalidConfig("eq.gain_db must be finite".into()));
        }
        if !(self.filter_ceiling_ratio > 0.0 && self.filter_ceiling_ratio < 1.0) {
            return Err(GameError::InvalidConfig(format!(
                "filter_ceiling_ratio must be in (0, 1), got {}",
                self.filter_ceiling_ratio
            )));
        }
        if !(self.min_center_hz.is_finite() && self.min_center_hz > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "min_center_hz must be > 0, got {}",
                self.min_center_hz
            )));
        }
        self.catalog().map(|_| ())
    }

    pub fn catalog(&self) -> Result<RangeCatalog> {
        RangeCatalog::new(self.ranges.clone())
    }
}
