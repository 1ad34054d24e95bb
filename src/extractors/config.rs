// src/extractors/config.rs
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::ConfigError;

/// Numeric knobs of the engine. The defaults are the values the form tool has
/// always shipped with; they are tunable, not derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blocks inspected after a heading anchor before giving up.
    pub max_window: usize,
    /// Paragraphs accepted into a strict section.
    pub max_paragraphs: usize,
    /// Blocks (and headings) shorter than this are noise.
    pub min_block_len: usize,
    /// Upper-case paragraphs shorter than this end a section.
    pub pseudo_heading_max_len: usize,
    /// Shortest string allowed to match by containment.
    pub min_containment_len: usize,
    /// Paragraphs shorter than this are never scan candidates.
    pub scan_min_len: usize,
    /// Default acceptance score in scan mode (field sets may override).
    pub scan_min_score: f64,
    /// Paragraphs kept in scan mode.
    pub scan_top_k: usize,
    /// Length bonus is `min(len / scan_length_divisor, scan_length_cap)`.
    pub scan_length_divisor: usize,
    pub scan_length_cap: f64,
    /// Paragraphs with no keyword hit are rejected whatever their length bonus.
    pub scan_require_keyword: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_window: 20,
            max_paragraphs: 3,
            min_block_len: 3,
            pseudo_heading_max_len: 50,
            min_containment_len: 3,
            scan_min_len: 30,
            scan_min_score: 10.0,
            scan_top_k: 5,
            scan_length_divisor: 20,
            scan_length_cap: 20.0,
            scan_require_keyword: true,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `DOCFORM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        override_from_env("DOCFORM_MAX_WINDOW", &mut config.max_window)?;
        override_from_env("DOCFORM_MAX_PARAGRAPHS", &mut config.max_paragraphs)?;
        override_from_env("DOCFORM_MIN_BLOCK_LEN", &mut config.min_block_len)?;
        override_from_env("DOCFORM_PSEUDO_HEADING_MAX_LEN", &mut config.pseudo_heading_max_len)?;
        override_from_env("DOCFORM_MIN_CONTAINMENT_LEN", &mut config.min_containment_len)?;
        override_from_env("DOCFORM_SCAN_MIN_LEN", &mut config.scan_min_len)?;
        override_from_env("DOCFORM_SCAN_MIN_SCORE", &mut config.scan_min_score)?;
        override_from_env("DOCFORM_SCAN_TOP_K", &mut config.scan_top_k)?;
        override_from_env("DOCFORM_SCAN_LENGTH_DIVISOR", &mut config.scan_length_divisor)?;
        override_from_env("DOCFORM_SCAN_LENGTH_CAP", &mut config.scan_length_cap)?;
        override_from_env("DOCFORM_SCAN_REQUIRE_KEYWORD", &mut config.scan_require_keyword)?;
        config.validate()?;
        tracing::debug!("Engine config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_length_divisor == 0 {
            return Err(invalid("scan_length_divisor", "0"));
        }
        if self.max_window == 0 {
            return Err(invalid("max_window", "0"));
        }
        if self.max_paragraphs == 0 {
            return Err(invalid("max_paragraphs", "0"));
        }
        if self.scan_top_k == 0 {
            return Err(invalid("scan_top_k", "0"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidSetting { name: name.to_string(), value: value.to_string() }
}

fn override_from_env<T: FromStr>(name: &str, target: &mut T) -> Result<(), ConfigError> {
    if let Ok(raw) = std::env::var(name) {
        *target = parse_setting(name, &raw)?;
        tracing::debug!("Using {}={} from environment", name, raw.trim());
    }
    Ok(())
}

fn parse_setting<T: FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| invalid(name, raw))
}
