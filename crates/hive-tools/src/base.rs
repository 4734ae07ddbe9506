//! The tool trait shared by host tools and agent-fabric tools

use anyhow::Error;
use async_trait::async_trait;
use hive_llm::ToolSchema;
use serde_json::Value;

use crate::context::CallContext;

/// A tool that can be used by an agent
#[async_trait]
pub trait AiTool: Send + Sync {
    /// The name of the tool
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// The JSON schema for the tool's parameters
    fn schema(&self) -> Value;

    /// Execute the tool with the given parameters
    ///
    /// `ctx` describes the agent call chain the tool runs inside; tools that
    /// call back into agents must pass it on.
    async fn execute(&self, params: Value, ctx: &CallContext) -> Result<Value, Error>;

    /// Validate the parameters against the schema
    fn validate_params(&self, _params: &Value) -> Result<(), Error> {
        Ok(())
    }

    /// Describe the tool for the model gateway
    fn to_schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}

/// Render a tool's JSON output as the text stored in a tool-result turn
pub fn render_tool_output(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fetch a required string parameter
pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, Error> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing or invalid '{}' parameter", key))
}
