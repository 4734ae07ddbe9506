//! Hive Common - Shared error types, configuration and enums
//!
//! This crate provides the error type, configuration structs and the small
//! vocabulary types (roles, lifecycle states, job kinds) used by every
//! other Hive crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::{BaseConfig, EngineConfig, HiveConfig, ProviderConfig, RegistryConfig, WorkspaceConfig};
pub use constants::*;
pub use error::{HiveError, Result};
pub use types::{AgentRole, JobKind, LifecycleState};
