//! Configuration types and utilities for Hive

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{self, timeouts};
use crate::error::{HiveError, Result};

/// Top-level configuration, loaded from `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    pub base: BaseConfig,
    pub provider: ProviderConfig,
    pub engine: EngineConfig,
    pub registry: RegistryConfig,
    pub workspace: WorkspaceConfig,
}

/// Base configuration that all components can use
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub data_dir: String,
    pub log_level: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Provider configuration for the model gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (e.g., "openai", "anthropic", "gemini")
    pub name: String,
    /// API key (optional, can use environment variables)
    pub api_key: Option<String>,
    /// Base URL for API (optional, uses provider default)
    pub base_url: Option<String>,
    /// Model every agent talks to
    pub default_model: String,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_PROVIDER.to_string(),
            api_key: None,
            base_url: None,
            default_model: "gpt-4o".to_string(),
            timeout_seconds: Some(timeouts::DEFAULT_LLM_TIMEOUT),
        }
    }
}

/// Policy knobs of the tool-calling loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum model rounds per invocation
    pub max_rounds: usize,
    /// Temperature used when the caller does not pass one
    pub default_temperature: f64,
    /// Maximum number of agents on one nested call chain
    pub max_call_depth: usize,
    /// Text reported when an invocation produced nothing usable
    pub no_output_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: constants::DEFAULT_MAX_ROUNDS,
            default_temperature: constants::DEFAULT_TEMPERATURE,
            max_call_depth: constants::DEFAULT_MAX_CALL_DEPTH,
            no_output_text: constants::DEFAULT_NO_OUTPUT_TEXT.to_string(),
        }
    }
}

/// Registry classification and activation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub manager_keywords: Vec<String>,
    pub worker_keywords: Vec<String>,
    pub max_parallel_activations: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manager_keywords: constants::DEFAULT_MANAGER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            worker_keywords: constants::DEFAULT_WORKER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            max_parallel_activations: constants::DEFAULT_MAX_PARALLEL_ACTIVATIONS,
        }
    }
}

/// Where host tools are allowed to touch the filesystem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub working_dir: PathBuf,
    pub shell_timeout_seconds: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("./data/workspace"),
            shell_timeout_seconds: timeouts::DEFAULT_SHELL_TIMEOUT,
        }
    }
}

impl HiveConfig {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            tracing::debug!("No config at {:?}, using defaults", config_path);
            return Ok(HiveConfig::default());
        }

        let config_str = fs::read_to_string(config_path)?;
        let config: HiveConfig = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_str = toml::to_string_pretty(self)
            .map_err(|e| HiveError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HiveError::Config("Failed to get config directory".to_string()))?;
        Ok(config_dir.join("hive").join("config.toml"))
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.max_rounds == 0 {
            return Err(HiveError::Config("engine.max_rounds must be at least 1".into()));
        }
        if self.engine.max_call_depth == 0 {
            return Err(HiveError::Config(
                "engine.max_call_depth must be at least 1".into(),
            ));
        }
        if self.registry.max_parallel_activations == 0 {
            return Err(HiveError::Config(
                "registry.max_parallel_activations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HiveConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.engine.max_rounds, 50);
        assert!(config.registry.manager_keywords.contains(&"supervisor".to_string()));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine]\nmax_rounds = 7\n").unwrap();

        let config = HiveConfig::load(&path).unwrap();
        assert_eq!(config.engine.max_rounds, 7);
        assert_eq!(config.engine.max_call_depth, constants::DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(config.provider.name, "openai");
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine]\nmax_rounds = 0\n").unwrap();

        let err = HiveConfig::load(&path).unwrap_err();
        assert!(matches!(err, HiveError::Config(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = HiveConfig::default();
        config.provider.default_model = "gemini-2.5-pro".into();
        config.save(&path).unwrap();

        let loaded = HiveConfig::load(&path).unwrap();
        assert_eq!(loaded.provider.default_model, "gemini-2.5-pro");
    }
}
