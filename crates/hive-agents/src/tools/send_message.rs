use anyhow::{Error, anyhow};
use async_trait::async_trait;
use hive_tools::{AiTool, CallContext};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::agents::Communicator;

/// Sends a message to another agent and waits for its answer
pub struct SendMessageTool {
    communicator: Arc<Communicator>,
}

impl SendMessageTool {
    pub fn new(communicator: Arc<Communicator>) -> Self {
        Self { communicator }
    }
}

#[async_trait]
impl AiTool for SendMessageTool {
    fn name(&self) -> &str {
        "send_message"
    }

    fn description(&self) -> &str {
        r#"Sends a message to another agent and returns its answer.
Parameters:
- `to`: Name of the receiving agent (see `get_known_agents`).
- `type`: Kind of message, e.g. "task", "question", "report".
- `message`: The message text.
"#
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Name of the receiving agent"
                },
                "type": {
                    "type": "string",
                    "description": "Kind of message, e.g. task, question or report"
                },
                "message": {
                    "type": "string",
                    "description": "The message text"
                }
            },
            "required": ["to", "type", "message"]
        })
    }

    async fn execute(&self, params: Value, ctx: &CallContext) -> Result<Value, Error> {
        let to = params
            .get("to")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing 'to' parameter"))?;
        let message = params
            .get("message")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing 'message' parameter"))?;
        let kind = params
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("message");

        let reply = self.communicator.send(to, kind, message, ctx).await;
        Ok(json!(reply))
    }
}
