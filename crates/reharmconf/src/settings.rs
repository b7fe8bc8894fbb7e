//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Values a fresh session starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Tonic used when `new` is given no key.
    /// Default: C
    #[serde(default = "DefaultsConfig::default_tonic")]
    pub tonic: String,

    /// Scale quality, `major` or `minor`.
    /// Default: major
    #[serde(default = "DefaultsConfig::default_scale")]
    pub scale: String,

    /// Chord token used when a chord is added without one.
    /// Default: maj7
    #[serde(default = "DefaultsConfig::default_chord")]
    pub chord: String,
}

impl DefaultsConfig {
    fn default_tonic() -> String {
        "C".to_string()
    }

    fn default_scale() -> String {
        "major".to_string()
    }

    fn default_chord() -> String {
        "maj7".to_string()
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tonic: Self::default_tonic(),
            scale: Self::default_scale(),
            chord: Self::default_chord(),
        }
    }
}

/// How new node ids are minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Uuid => write!(f, "uuid"),
            IdStrategy::Sequential => write!(f, "sequential"),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "sequential" | "seq" => Ok(IdStrategy::Sequential),
            other => Err(format!("unknown id strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsConfig {
    /// Default: uuid
    #[serde(default)]
    pub strategy: IdStrategy,

    /// Prefix for sequential ids (`n1`, `n2`, ...).
    /// Default: n
    #[serde(default = "IdsConfig::default_prefix")]
    pub prefix: String,
}

impl IdsConfig {
    fn default_prefix() -> String {
        "n".to_string()
    }
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            strategy: IdStrategy::default(),
            prefix: Self::default_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive for the log subscriber.
    /// Default: warn
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
