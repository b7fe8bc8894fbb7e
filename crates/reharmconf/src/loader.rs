//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, IdStrategy, ReharmConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli). Only returns
/// files that exist.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/reharm/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("reharm/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("reharm.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load a single TOML file on top of the compiled defaults.
pub fn load_from_file(path: &Path) -> Result<ReharmConfig, ConfigError> {
    let mut config = ReharmConfig::default();
    apply_file(&mut config, path)?;
    Ok(config)
}

/// Layer the keys present in `path` over `config`. Absent keys keep
/// whatever earlier files set.
pub fn apply_file(config: &mut ReharmConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

fn apply_toml(config: &mut ReharmConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let table: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| parse_error(e.to_string()))?;

    if let Some(defaults) = table.get("defaults").and_then(|v| v.as_table()) {
        if let Some(v) = defaults.get("tonic").and_then(|v| v.as_str()) {
            config.defaults.tonic = v.to_string();
        }
        if let Some(v) = defaults.get("scale").and_then(|v| v.as_str()) {
            config.defaults.scale = v.to_string();
        }
        if let Some(v) = defaults.get("chord").and_then(|v| v.as_str()) {
            config.defaults.chord = v.to_string();
        }
    }

    if let Some(ids) = table.get("ids").and_then(|v| v.as_table()) {
        if let Some(v) = ids.get("strategy").and_then(|v| v.as_str()) {
            config.ids.strategy = v.parse::<IdStrategy>().map_err(parse_error)?;
        }
        if let Some(v) = ids.get("prefix").and_then(|v| v.as_str()) {
            config.ids.prefix = v.to_string();
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(())
}

/// Apply `REHARM_*` environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ReharmConfig, sources: &mut ConfigSources) {
    apply_overrides(config, sources, |key| env::var(key).ok());
}

fn apply_overrides(
    config: &mut ReharmConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("REHARM_TONIC") {
        config.defaults.tonic = v;
        sources.env_overrides.push("REHARM_TONIC".to_string());
    }
    if let Some(v) = lookup("REHARM_SCALE") {
        config.defaults.scale = v;
        sources.env_overrides.push("REHARM_SCALE".to_string());
    }
    if let Some(v) = lookup("REHARM_ID_STRATEGY") {
        if let Ok(strategy) = v.parse() {
            config.ids.strategy = strategy;
            sources.env_overrides.push("REHARM_ID_STRATEGY".to_string());
        }
    }
    if let Some(v) = lookup("REHARM_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("REHARM_LOG_LEVEL".to_string());
    }
}
