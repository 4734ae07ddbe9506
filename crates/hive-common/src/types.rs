//! Common types used across Hive components

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::HiveError;

/// Role of an agent within the population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Plans and delegates
    Manager,
    /// Executes delegated work
    Worker,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Manager => write!(f, "manager"),
            AgentRole::Worker => write!(f, "worker"),
        }
    }
}

/// Lifecycle state of a registered agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Passive,
    Active,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Passive => write!(f, "passive"),
            LifecycleState::Active => write!(f, "active"),
        }
    }
}

/// Job requested for an agent spawned at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Manager,
    SystemWorker,
    WebWorker,
}

impl JobKind {
    /// Role the spawned agent is registered under
    pub fn role(self) -> AgentRole {
        match self {
            JobKind::Manager => AgentRole::Manager,
            JobKind::SystemWorker | JobKind::WebWorker => AgentRole::Worker,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Manager => write!(f, "manager"),
            JobKind::SystemWorker => write!(f, "system_worker"),
            JobKind::WebWorker => write!(f, "web_worker"),
        }
    }
}

impl FromStr for JobKind {
    type Err = HiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manager" => Ok(JobKind::Manager),
            "system_worker" => Ok(JobKind::SystemWorker),
            "web_worker" => Ok(JobKind::WebWorker),
            other => Err(HiveError::Config(format!(
                "unknown job '{}', expected manager|system_worker|web_worker",
                other
            ))),
        }
    }
}
