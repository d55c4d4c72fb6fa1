//! Session configuration
//!
//! Loaded from YAML; every field is optional and falls back to the same
//! defaults a fresh interactive session starts with.

use std::fs;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use crate::mh_interface::{Strategy, TrialCount};
use crate::mh_session::{Session, SessionError, Speed, DEFAULT_BATCH};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid hex seed: {0}")]
    InvalidSeed(String),

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Configuration for an interactive or batch session
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Strategy selected at start-up
    pub strategy: Strategy,

    /// Trials per batch run
    pub runs: TrialCount,

    pub speed: Speed,

    /// Hex encoded 32 byte seed (None = generate random)
    pub seed: Option<String>,

    pub log_level: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Switch,
            runs: DEFAULT_BATCH,
            speed: Speed::Normal,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl SimConfig {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml, path)
    }

    /// Get or generate seed
    pub fn resolve_seed(&self) -> Result<[u8; 32], ConfigError> {
        match &self.seed {
            Some(hex) => parse_seed_hex(hex),
            None => Ok(random_seed()),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Build a session with the configured selections applied
    pub fn build_session(&self) -> Result<Session, ConfigError> {
        let mut session = Session::new(self.resolve_seed()?);
        session.select_strategy(self.strategy);
        session.set_batch_size(self.runs)?;
        session.set_speed(self.speed);
        Ok(session)
    }
}

pub fn random_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    StdRng::from_entropy().fill_bytes(&mut seed);
    seed
}

/// Parse up to 32 hex-encoded bytes, optionally prefixed with `0x`.
/// Missing trailing bytes stay zero.
pub fn parse_seed_hex(hex: &str) -> Result<[u8; 32], ConfigError> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.is_empty() || hex.len() > 64 || hex.len() % 2 != 0 {
        return Err(ConfigError::InvalidSeed(hex.to_string()));
    }

    let mut seed = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let byte_str =
            std::str::from_utf8(chunk).map_err(|_| ConfigError::InvalidSeed(hex.to_string()))?;
        seed[i] = u8::from_str_radix(byte_str, 16)
            .map_err(|_| ConfigError::InvalidSeed(hex.to_string()))?;
    }

    Ok(seed)
}

pub fn seed_to_hex(seed: &[u8; 32]) -> String {
    seed.iter().map(|b| format!("{:02x}", b)).collect()
}
