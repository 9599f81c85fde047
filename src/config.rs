//! Configuration management for the gateway using the prefer crate.
//!
//! Precedence, lowest to highest: built-in defaults, config file,
//! `NLP_GATEWAY_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::pipeline::{PipelineConfig, DEFAULT_MAX_LENGTH, DEFAULT_MODEL};

/// Name used for config file discovery (`nlp-gateway.toml`, `.yaml`, ...).
pub const CONFIG_NAME: &str = "nlp-gateway";

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

pub const ENV_BIND: &str = "NLP_GATEWAY_BIND";
pub const ENV_MODEL: &str = "NLP_GATEWAY_MODEL";
pub const ENV_MAX_LENGTH: &str = "NLP_GATEWAY_MAX_LENGTH";

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Listen address: "port", "host" or "host:port".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Pipeline model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Longest accepted text, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Allowed CORS origins; "*" allows any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub cors_origins: Vec<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a config file in the standard locations.
    ///
    /// A missing or unreadable file yields the defaults.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file {}: {}", path.display(), e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file, parsed by extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Fill `settings` with every key this file sets.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref model) = self.model {
            settings.model = model.clone();
        }
        if let Some(max_length) = self.max_length {
            settings.max_length = max_length;
        }
        if !self.cors_origins.is_empty() {
            settings.cors_origins = self.cors_origins.clone();
        }
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: String,
    pub model: String,
    pub max_length: usize,
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Settings {
    /// Apply `NLP_GATEWAY_*` overrides read through `var`.
    ///
    /// Empty values are ignored; an unparsable `NLP_GATEWAY_MAX_LENGTH` is
    /// logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = var(ENV_BIND) {
            tracing::debug!("Using {} from environment: {}", ENV_BIND, bind);
            self.bind = bind;
        }
        if let Some(model) = var(ENV_MODEL) {
            tracing::debug!("Using {} from environment: {}", ENV_MODEL, model);
            self.model = model;
        }
        if let Some(raw) = var(ENV_MAX_LENGTH) {
            match raw.trim().parse::<usize>() {
                Ok(max_length) => self.max_length = max_length,
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", ENV_MAX_LENGTH, raw),
            }
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_length: self.max_length,
        }
    }
}

/// Options controlling where configuration is read from.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file; skips discovery and must parse.
    pub config_path: Option<PathBuf>,
}

/// Resolve settings from defaults, the config file and the environment.
pub async fn load_settings_with_options(options: LoadOptions) -> anyhow::Result<Settings> {
    let config = match options.config_path {
        Some(ref path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };
    if let Some(ref path) = config.source_path {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nlp-gateway.toml");
        std::fs::write(
            &path,
            "bind = \"0.0.0.0:9000\"\nmax_length = 500\ncors_origins = [\"http://localhost:3000\"]\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.bind.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(config.max_length, Some(500));
        assert_eq!(config.model, None);
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));

        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings);
        assert_eq!(settings.bind, "0.0.0.0:9000");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.max_length, 500);
        assert_eq!(settings.cors_origins, vec!["http://localhost:3000"]);
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("gw.yaml");
        std::fs::write(&yaml, "model: en_rules_sm\nbind: \"8080\"\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.model.as_deref(), Some("en_rules_sm"));
        assert_eq!(config.bind.as_deref(), Some("8080"));

        let json = dir.path().join("gw.json");
        std::fs::write(&json, r#"{"max_length": 42}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.max_length, Some(42));
        assert!(config.cors_origins.is_empty());
    }

    #[tokio::test]
    async fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "bind = [").unwrap();
        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(err.contains("TOML"));

        let missing = dir.path().join("missing.json");
        assert!(Config::load_from_path(&missing).await.is_err());
    }

    #[tokio::test]
    async fn test_explicit_config_must_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let result = load_settings_with_options(LoadOptions {
            config_path: Some(path),
        })
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind, "127.0.0.1:8000");
        assert_eq!(settings.model, "en_rules_sm");
        assert_eq!(settings.max_length, 1_000_000);
        assert_eq!(settings.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BIND, "0.0.0.0"),
            (ENV_MODEL, "custom"),
            (ENV_MAX_LENGTH, "1234"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.bind, "0.0.0.0");
        assert_eq!(settings.model, "custom");
        assert_eq!(settings.max_length, 1234);
    }

    #[test]
    fn test_env_overrides_ignore_empty_and_invalid() {
        let env: HashMap<&str, &str> = [(ENV_BIND, " "), (ENV_MAX_LENGTH, "lots")]
            .into_iter()
            .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings, Settings::default());
    }
}
