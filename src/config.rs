//! Configuration file parser for ~/.config/linkhub/config.toml.
//!
//! The config file is optional; a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged, since they are
//! usually typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::opener::FallbackPolicy;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid seed_url '{url}': {source}")]
    SeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

// ============================================================================
// Configuration
// ============================================================================

const KNOWN_KEYS: &[&str] = &[
    "theme",
    "seed_url",
    "seed_path",
    "export_dir",
    "fallback_initial_delay_ms",
    "fallback_retry_delay_ms",
    "keybindings",
];

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys can be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Remote seed fetched on first run, before the seed file.
    pub seed_url: Option<String>,

    /// Seed file read on first run. Defaults to `links.json` in the config dir.
    pub seed_path: Option<PathBuf>,

    /// Where backups are written. Defaults to the current directory.
    pub export_dir: Option<PathBuf>,

    /// Wait before trying a link's second URL.
    pub fallback_initial_delay_ms: u64,

    /// Wait before each further URL.
    pub fallback_retry_delay_ms: u64,

    /// Keybinding overrides: action name to key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let policy = FallbackPolicy::default();
        Self {
            theme: "dark".to_string(),
            seed_url: None,
            seed_path: None,
            export_dir: None,
            fallback_initial_delay_ms: policy.initial_delay.as_millis() as u64,
            fallback_retry_delay_ms: policy.retry_delay.as_millis() as u64,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with location info
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), theme = %config.theme, "Loaded configuration");
        Ok(config)
    }

    /// Parsed `seed_url`, if set.
    pub fn seed_url(&self) -> Result<Option<Url>, ConfigError> {
        self.seed_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Url::parse(s).map_err(|source| ConfigError::SeedUrl {
                    url: s.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Delays for the link-open fallback sequence.
    pub fn fallback_policy(&self) -> FallbackPolicy {
        FallbackPolicy {
            initial_delay: Duration::from_millis(self.fallback_initial_delay_ms),
            retry_delay: Duration::from_millis(self.fallback_retry_delay_ms),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
