//! Scenario file format

use mh_rust::mh_config::ConfigError;
use mh_rust::{Strategy, TrialCount};
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
pub struct ScenarioFile {
    /// Scenario metadata
    #[serde(default)]
    pub meta: ScenarioMeta,

    /// Hex seed (None = generate random)
    #[serde(default)]
    pub seed: Option<String>,

    /// Batches, run in order
    pub batches: Vec<BatchPlan>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hypothesis: Option<String>,
}

/// One batch of trials
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BatchPlan {
    pub strategy: Strategy,
    pub runs: TrialCount,

    /// Clear all counters before this batch
    #[serde(default)]
    pub reset_before: bool,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// All `.yaml`/`.yml` files directly inside `dir`, sorted by path
pub fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = fs::read_dir(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut scenarios: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .collect();

    scenarios.sort();
    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_scenarios_all_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let files = scenario_files(&dir).unwrap();

        assert!(!files.is_empty());
        for path in &files {
            let scenario = ScenarioFile::load(path)
                .unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
            assert!(!scenario.batches.is_empty(), "{}", path.display());
        }
    }

    #[test]
    fn test_session_config_is_not_a_scenario() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/session.yaml");
        assert!(matches!(ScenarioFile::load(&path), Err(ConfigError::Yaml { .. })));
    }
}
