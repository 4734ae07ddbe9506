//! Role classification for agents constructed without an explicit role

use hive_common::{AgentRole, HiveError, RegistryConfig, Result};

/// Derives an agent's role from its name
///
/// Matching is a case-insensitive substring test. A name that matches both a
/// manager keyword and a worker keyword is rejected instead of guessed.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    manager_keywords: Vec<String>,
    worker_keywords: Vec<String>,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::from_config(&RegistryConfig::default())
    }
}

impl RoleClassifier {
    pub fn new(manager_keywords: Vec<String>, worker_keywords: Vec<String>) -> Self {
        Self {
            manager_keywords: manager_keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            worker_keywords: worker_keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(
            config.manager_keywords.clone(),
            config.worker_keywords.clone(),
        )
    }

    /// Classify `name`; unmatched names are workers
    pub fn classify(&self, name: &str) -> Result<AgentRole> {
        let lowered = name.to_lowercase();
        let manager = self
            .manager_keywords
            .iter()
            .find(|k| !k.is_empty() && lowered.contains(k.as_str()));
        let worker = self
            .worker_keywords
            .iter()
            .find(|k| !k.is_empty() && lowered.contains(k.as_str()));

        match (manager, worker) {
            (Some(m), Some(w)) => Err(HiveError::Config(format!(
                "Agent name '{}' is ambiguous: matches manager keyword '{}' and worker keyword '{}'",
                name, m, w
            ))),
            (Some(_), None) => Ok(AgentRole::Manager),
            (None, _) => Ok(AgentRole::Worker),
        }
    }
}
