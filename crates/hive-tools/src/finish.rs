//! The engine-owned `finish` tool

use anyhow::Error;
use async_trait::async_trait;
use hive_common::FINISH_TOOL_NAME;
use serde_json::{Value, json};

use crate::base::{AiTool, required_str};
use crate::context::CallContext;

/// Marks a task or dialog as completed; its message is the invocation's output
///
/// Every agent engine owns one. It is never stored in a `ToolSet`, so host
/// tools cannot shadow it.
#[derive(Debug, Default)]
pub struct FinishTool;

impl FinishTool {
    /// Extract the completion message from the call arguments
    pub fn message(params: &Value) -> Result<String, Error> {
        Ok(required_str(params, "message")?.to_string())
    }
}

#[async_trait]
impl AiTool for FinishTool {
    fn name(&self) -> &str {
        FINISH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Call this function when you consider a task or dialog completed. \
         `message` is the final answer handed back to whoever assigned the task."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "Concise summary of what was done"
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &CallContext) -> Result<Value, Error> {
        let message = Self::message(&params)?;
        Ok(json!(format!("[FINISHED] {}", message)))
    }
}
