//! Agent-fabric tools
//!
//! Tools that let agents see and message each other and grow the
//! population at runtime.

pub mod known_agents;
pub mod send_message;
pub mod spawn_agents;

// Re-export key tools for convenience
pub use known_agents::GetKnownAgentsTool;
pub use send_message::SendMessageTool;
pub use spawn_agents::{AgentSpec, SpawnAgentsTool};
