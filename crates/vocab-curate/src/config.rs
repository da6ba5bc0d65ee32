//! Configuration loaded from a TOML file.
//!
//! ```toml
//! [registry]
//! dir = "registry"
//!
//! [registry.files]
//! seed = "seed.json"
//!
//! [matching]
//! auto_accept_threshold = 0.90
//! suggest_threshold = 0.60
//!
//! [curation]
//! curator = "analyst"
//! nightly_threshold = 0.95
//! audit_log = "registry/audit.jsonl"
//!
//! [discovery]
//! cache_ttl_secs = 3600
//! ```
//!
//! Every key is optional. `VOCAB_REGISTRY_DIR` replaces `registry.dir`.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vocab_map::MatchThresholds;
use vocab_registry::{CanonicalRegistry, LayerFiles, RegistryError};

use crate::error::ConfigError;

/// Environment variable overriding the registry directory.
pub const REGISTRY_DIR_ENV: &str = "VOCAB_REGISTRY_DIR";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabConfig {
    pub registry: RegistrySettings,
    pub matching: MatchingSettings,
    pub curation: CurationSettings,
    pub discovery: DiscoverySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Directory holding the four layer files.
    pub dir: PathBuf,
    pub files: LayerFiles,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("registry"),
            files: LayerFiles::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    pub auto_accept_threshold: f64,
    pub suggest_threshold: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        let thresholds = MatchThresholds::default();
        Self {
            auto_accept_threshold: thresholds.auto_accept(),
            suggest_threshold: thresholds.suggest(),
        }
    }
}

impl MatchingSettings {
    pub fn thresholds(&self) -> Result<MatchThresholds, ConfigError> {
        Ok(MatchThresholds::new(
            self.auto_accept_threshold,
            self.suggest_threshold,
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationSettings {
    /// Identity recorded on curation actions.
    pub curator: String,
    /// Minimum confidence promoted by the nightly run.
    pub nightly_threshold: f64,
    /// JSON-lines file every curation action is appended to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
    /// Default number of entries shown by a review.
    pub review_limit: usize,
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            curator: "curator".to_string(),
            nightly_threshold: 0.95,
            audit_log: None,
            review_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Catalog cache lifetime. Zero disables caching.
    pub cache_ttl_secs: u64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 60 * 60,
        }
    }
}

impl DiscoverySettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl VocabConfig {
    /// Reads `path`, applies the environment override and validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env();
        config.validate()?;
        info!(path = %path.display(), registry = %config.registry.dir.display(), "loaded config");
        Ok(config)
    }

    /// Loads `path` when given, otherwise starts from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let mut config = Self::default();
                config.apply_env();
                config.validate()?;
                debug!("using default config");
                Ok(config)
            }
        }
    }

    /// Parses and validates TOML text. The environment is not consulted.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.override_registry_dir(std::env::var_os(REGISTRY_DIR_ENV));
    }

    /// Replaces the registry directory when `dir` is a non-empty value.
    pub fn override_registry_dir(&mut self, dir: Option<OsString>) {
        if let Some(dir) = dir.filter(|dir| !dir.is_empty()) {
            debug!(dir = ?dir, "registry directory overridden");
            self.registry.dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.thresholds()?;
        if !(0.0..=1.5).contains(&self.curation.nightly_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "curation.nightly_threshold",
                message: format!("{} is outside 0.0..=1.5", self.curation.nightly_threshold),
            });
        }
        if self.curation.curator.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "curation.curator",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn open_registry(&self) -> Result<CanonicalRegistry, RegistryError> {
        CanonicalRegistry::open(&self.registry.dir, &self.registry.files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = VocabConfig::from_toml_str("").unwrap();
        assert_eq!(config, VocabConfig::default());
        assert_eq!(config.matching.auto_accept_threshold, 0.90);
        assert_eq!(config.matching.suggest_threshold, 0.60);
        assert_eq!(config.curation.nightly_threshold, 0.95);
        assert_eq!(config.registry.files.delta, "delta.json");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = VocabConfig::from_toml_str(
            r#"
            [registry]
            dir = "/data/vocab"

            [registry.files]
            overrides = "accepted.json"

            [matching]
            suggest_threshold = 0.5

            [curation]
            curator = "analyst"
            audit_log = "/data/vocab/audit.jsonl"
            "#,
        )
        .unwrap();

        assert_eq!(config.registry.dir, PathBuf::from("/data/vocab"));
        assert_eq!(config.registry.files.overrides, "accepted.json");
        assert_eq!(config.registry.files.seed, "seed.json");
        assert_eq!(config.matching.auto_accept_threshold, 0.90);
        assert_eq!(config.matching.suggest_threshold, 0.5);
        assert_eq!(config.curation.curator, "analyst");
        assert_eq!(config.discovery.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn inverted_thresholds_fail_validation() {
        let err = VocabConfig::from_toml_str(
            "[matching]\nauto_accept_threshold = 0.5\nsuggest_threshold = 0.7\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Thresholds(_)));
    }

    #[test]
    fn blank_curator_fails_validation() {
        let err = VocabConfig::from_toml_str("[curation]\ncurator = \" \"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "curation.curator",
                ..
            }
        ));
    }

    #[test]
    fn registry_dir_override() {
        let mut config = VocabConfig::default();
        config.override_registry_dir(Some(OsString::new()));
        assert_eq!(config.registry.dir, PathBuf::from("registry"));
        config.override_registry_dir(Some(OsString::from("/srv/registry")));
        assert_eq!(config.registry.dir, PathBuf::from("/srv/registry"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = VocabConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
