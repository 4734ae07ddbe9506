//! Hive LLM - Conversation model and model gateway
//!
//! This crate defines the turns an agent conversation is made of, the
//! `ModelGateway` seam the engine talks to, and a gateway backed by `genai`.

pub mod conversation;
pub mod gateway;
pub mod genai_gateway;

pub use conversation::{AssistantTurn, ContentPart, ToolCallRequest, Turn};
pub use gateway::{ModelGateway, ToolSchema};
pub use genai_gateway::GenaiGateway;
