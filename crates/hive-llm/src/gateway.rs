//! The seam between an agent engine and whatever model answers it

use async_trait::async_trait;
use hive_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::{AssistantTurn, Turn};

/// Description of a tool as advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's arguments
    pub parameters: Value,
}

/// A model that produces the next assistant turn of a conversation
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send the conversation and return the model's next turn
    ///
    /// Implementations may return any number of tool calls. Failures here are
    /// the only errors the engine surfaces to its caller unchanged.
    async fn send(
        &self,
        conversation: &[Turn],
        temperature: f64,
        tools: &[ToolSchema],
    ) -> Result<AssistantTurn>;

    /// Identifier used in logs
    fn model_name(&self) -> &str;
}
