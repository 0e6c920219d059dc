use crate::catalog::TemplateStore;
use crate::error::{Result, SpinboxError};
use crate::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GlobalConfig
// ---------------------------------------------------------------------------

pub const KEYS: &[&str] = &[
    "python_version",
    "node_version",
    "default_profile",
    "with_deps",
    "with_examples",
];

const DEFAULT_PYTHON_VERSION: &str = "3.12";
const DEFAULT_NODE_VERSION: &str = "20";

static VERSION_RE: OnceLock<Regex> = OnceLock::new();

fn version_re() -> &'static Regex {
    VERSION_RE.get_or_init(|| Regex::new(r"^\d+(\.\d+){0,2}$").unwrap())
}

/// User-level defaults, stored in `<user dir>/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_python_version")]
    pub python_version: String,
    #[serde(default = "default_node_version")]
    pub node_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub with_deps: bool,
    #[serde(default)]
    pub with_examples: bool,
}

fn default_version() -> u32 {
    1
}

fn default_python_version() -> String {
    DEFAULT_PYTHON_VERSION.to_string()
}

fn default_node_version() -> String {
    DEFAULT_NODE_VERSION.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            version: 1,
            python_version: default_python_version(),
            node_version: default_node_version(),
            default_profile: None,
            with_deps: false,
            with_examples: false,
        }
    }
}

impl GlobalConfig {
    /// Load from `user_dir`, falling back to defaults when no file exists.
    pub fn load(user_dir: &Path) -> Result<Self> {
        let path = paths::global_config_path(user_dir);
        match crate::io::read_optional(&path)? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, user_dir: &Path) -> Result<()> {
        let path = paths::global_config_path(user_dir);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Key access
    // -----------------------------------------------------------------------

    /// Current value of `key` rendered as text. Unset options render empty.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "python_version" => self.python_version.clone(),
            "node_version" => self.node_version.clone(),
            "default_profile" => self.default_profile.clone().unwrap_or_default(),
            "with_deps" => self.with_deps.to_string(),
            "with_examples" => self.with_examples.to_string(),
            _ => return Err(SpinboxError::UnknownConfigKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "python_version" => self.python_version = parse_version(key, value)?,
            "node_version" => self.node_version = parse_version(key, value)?,
            "default_profile" => {
                self.default_profile = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            "with_deps" => self.with_deps = parse_bool(key, value)?,
            "with_examples" => self.with_examples = parse_bool(key, value)?,
            _ => return Err(SpinboxError::UnknownConfigKey(key.to_string())),
        }
        Ok(())
    }

    /// Restore one key, or every key when `key` is `None`, to its default.
    pub fn reset(&mut self, key: Option<&str>) -> Result<()> {
        let defaults = Self::default();
        match key {
            None => *self = defaults,
            Some(k) => {
                let value = defaults.get(k)?;
                self.set(k, &value)?;
            }
        }
        Ok(())
    }

    pub fn list(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .map(|k| (*k, self.get(k).unwrap_or_default()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, store: &TemplateStore) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(profile) = &self.default_profile {
            if store.profile(profile).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("default_profile '{profile}' is not a known profile"),
                });
            }
        }

        for (key, value) in [
            ("python_version", &self.python_version),
            ("node_version", &self.node_version),
        ] {
            if !version_re().is_match(value) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{key} '{value}' is not a dotted version number"),
                });
            }
        }

        warnings
    }
}

fn parse_version(key: &str, value: &str) -> Result<String> {
    if version_re().is_match(value) {
        Ok(value.to_string())
    } else {
        Err(SpinboxError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a version like 3.12 or 20".to_string(),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(SpinboxError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
