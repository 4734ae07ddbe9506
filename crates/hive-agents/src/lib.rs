//! Hive Agents - Agent engine, registry and inter-agent messaging
//!
//! This crate provides the agent execution engine (the bounded tool-calling
//! loop), the registry that supervises a population of agents, the
//! per-agent communicators, and the agent-facing tools built on them.

pub mod agents;
pub mod tools;

// Re-export key types for convenience
pub use agents::{
    ActivationReport, Agent, AgentBuilder, AgentRegistry, Communicator, Envelope, InvokeOutput,
    InvokeRequest, NO_KNOWN_AGENTS, RoleClassifier, WeakRegistry, compose_prompt, run_once_agent,
};
pub use tools::{AgentSpec, GetKnownAgentsTool, SendMessageTool, SpawnAgentsTool};
