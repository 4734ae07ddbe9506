//! Hive Framework - Unified framework re-exporting all Hive components
//!
//! This meta-crate provides a unified API surface by re-exporting
//! all functionality from the individual Hive crates.

// Re-export all functionality from Hive crates
pub use hive_agents as agents;
pub use hive_common as common;
pub use hive_llm as llm;
pub use hive_tools as tools;

// Re-export top-level types for convenience
pub use hive_agents::{Agent, AgentRegistry, InvokeOutput, InvokeRequest};
pub use hive_common::{HiveConfig, HiveError, Result};
pub use hive_llm::{GenaiGateway, ModelGateway};
pub use hive_tools::{AiTool, CallContext, ToolSet};

/// Convenience prelude module for common imports
pub mod prelude {
    // Common types and errors
    pub use hive_common::{
        AgentRole, EngineConfig, HiveConfig, HiveError, JobKind, LifecycleState, ProviderConfig,
        RegistryConfig, Result, WorkspaceConfig,
    };

    // Conversation and model gateway
    pub use hive_llm::{
        AssistantTurn, ContentPart, GenaiGateway, ModelGateway, ToolCallRequest, ToolSchema, Turn,
    };

    // Tools
    pub use hive_tools::{
        AiTool, CallContext, FetchPageTool, FinishTool, SaveCodeTool, ShellTool, ToolSet,
    };

    // Agent system
    pub use hive_agents::{
        ActivationReport, Agent, AgentBuilder, AgentRegistry, Communicator, InvokeOutput,
        InvokeRequest, RoleClassifier, run_once_agent,
    };
}
