//! Configuration loading for reharm.
//!
//! # Usage
//!
//! ```rust,no_run
//! use reharmconf::ReharmConfig;
//!
//! let config = ReharmConfig::load().expect("Failed to load config");
//! println!("Default key: {} {}", config.defaults.tonic, config.defaults.scale);
//! println!("Ids: {}", config.ids.strategy);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/reharm/config.toml` (system)
//! 2. `~/.config/reharm/config.toml` (user)
//! 3. `./reharm.toml` (local override, or the path given with `--config`)
//! 4. Environment variables (`REHARM_*`)
//!
//! # Example Config
//!
//! ```toml
//! [defaults]
//! tonic = "Bb"
//! scale = "major"
//! chord = "7"
//!
//! [ids]
//! strategy = "sequential"
//! prefix = "n"
//!
//! [telemetry]
//! log_level = "reharm=debug"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use settings::{DefaultsConfig, IdStrategy, IdsConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to render config: {0}")]
    Render(String),
}

/// Complete reharm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReharmConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub ids: IdsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ReharmConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with `config_path` standing in for `./reharm.toml`.
    /// System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ReharmConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let body = toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))?;
        Ok(format!("# reharm configuration\n\n{body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_to_toml_parses_back() {
        let mut config = ReharmConfig::default();
        config.defaults.tonic = "F#".to_string();
        config.ids.strategy = IdStrategy::Sequential;

        let parsed: ReharmConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_to_toml_escapes_quotes_and_backslashes() {
        let mut config = ReharmConfig::default();
        config.ids.prefix = r#"n"\"#.to_string();
        config.telemetry.log_level = r#"reharm[{name="x\y"}]=debug"#.to_string();

        let text = config.to_toml().unwrap();
        assert!(text.starts_with("# reharm configuration\n"));
        let parsed: ReharmConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ntonic = \"Eb\"\nscale = \"minor\"").unwrap();

        let (config, sources) = ReharmConfig::load_with_sources_from(Some(file.path())).unwrap();
        assert!(sources.files.iter().any(|p| p == file.path()));
        // env overrides may apply on the test host; only check what they cannot touch
        assert_eq!(config.defaults.chord, "maj7");
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reharm.toml");
        std::fs::write(&path, "[ids]\nstrategy = \"random\"\n").unwrap();

        let err = ReharmConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }
}
