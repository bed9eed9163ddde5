//! Front-end settings, loaded from a YAML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pn_core::validate::{DEFAULT_ENERGY_CUTOFF, MAX_ENERGY_CUTOFF};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const API_URL_ENV: &str = "PHASENAV_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STORAGE_DIR: &str = ".phasenav";
pub const DEFAULT_FUNCTIONAL: &str = "GGA_GGA_U_R2SCAN";

/// Cosmetic pauses between progress markers, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressTiming {
    pub after_validating_ms: u64,
    pub before_fetching_ms: u64,
    pub after_building_ms: u64,
}

impl Default for ProgressTiming {
    fn default() -> Self {
        Self {
            after_validating_ms: 300,
            before_fetching_ms: 200,
            after_building_ms: 200,
        }
    }
}

impl ProgressTiming {
    pub fn none() -> Self {
        Self {
            after_validating_ms: 0,
            before_fetching_ms: 0,
            after_building_ms: 0,
        }
    }

    pub fn after_validating(&self) -> Duration {
        Duration::from_millis(self.after_validating_ms)
    }

    pub fn before_fetching(&self) -> Duration {
        Duration::from_millis(self.before_fetching_ms)
    }

    pub fn after_building(&self) -> Duration {
        Duration::from_millis(self.after_building_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub default_functional: String,
    pub supported_functionals: Vec<String>,
    pub default_energy_cutoff: f64,
    pub max_energy_cutoff: f64,
    pub progress: ProgressTiming,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            default_functional: DEFAULT_FUNCTIONAL.to_string(),
            supported_functionals: vec![
                "GGA_GGA_U_R2SCAN".to_string(),
                "R2SCAN".to_string(),
                "GGA_GGA_U".to_string(),
            ],
            default_energy_cutoff: DEFAULT_ENERGY_CUTOFF,
            max_energy_cutoff: MAX_ENERGY_CUTOFF,
            progress: ProgressTiming::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Reads `path` when given and present; otherwise defaults. The
    /// `PHASENAV_API_URL` environment variable wins over the file.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let settings = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                debug!(path = %path.display(), "settings file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        Ok(settings.apply_env(|name| std::env::var(name).ok()))
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Applies environment overrides through `lookup`.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            debug!(%url, "API base URL taken from environment");
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Human label for the functional choices the front-ends offer.
pub fn functional_label(functional: &str) -> &str {
    match functional {
        "GGA_GGA_U_R2SCAN" => "GGA/GGA+U/r2SCAN (mixed)",
        "R2SCAN" => "r2SCAN only",
        "GGA_GGA_U" => "GGA/GGA+U only",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(s.default_functional, "GGA_GGA_U_R2SCAN");
        assert_eq!(s.supported_functionals.len(), 3);
        assert_eq!(s.default_energy_cutoff, 0.2);
        assert_eq!(s.max_energy_cutoff, 2.0);
        assert_eq!(s.progress.after_validating(), Duration::from_millis(300));
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "api_base_url: https://phase.example.org\nprogress:\n  after_validating_ms: 0\n";
        let s = Settings::from_yaml(yaml).unwrap();
        assert_eq!(s.api_base_url, "https://phase.example.org");
        assert_eq!(s.progress.after_validating_ms, 0);
        assert_eq!(s.progress.before_fetching_ms, 200);
        assert_eq!(s.storage_dir, PathBuf::from(".phasenav"));
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn yaml_roundtrip() {
        let s = Settings::default().with_api_base_url("http://10.0.0.2:9000");
        let back = Settings::from_yaml(&s.to_yaml().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn env_overrides_base_url() {
        let s = Settings::default().apply_env(|name| {
            (name == API_URL_ENV).then(|| " http://override:1 ".to_string())
        });
        assert_eq!(s.api_base_url, "http://override:1");

        let unchanged = Settings::default().apply_env(|_| Some(String::new()));
        assert_eq!(unchanged.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("phasenav-settings-does-not-exist.yaml");
        assert!(!path.exists());
        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.storage_dir, PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(s.progress, ProgressTiming::default());
    }

    #[test]
    fn unreadable_yaml_is_config_error() {
        let dir = std::env::temp_dir().join(format!("pn-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.yaml");
        std::fs::write(&path, "api_base_url: [unterminated").unwrap();
        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn labels_fall_through_for_unknown_names() {
        assert_eq!(functional_label("R2SCAN"), "r2SCAN only");
        assert_eq!(functional_label("GGA"), "GGA");
    }
}
