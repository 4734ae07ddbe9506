use anyhow::Error;
use async_trait::async_trait;
use hive_tools::{AiTool, CallContext};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::agents::Communicator;

/// Lists the agents the owner can message
pub struct GetKnownAgentsTool {
    communicator: Arc<Communicator>,
}

impl GetKnownAgentsTool {
    pub fn new(communicator: Arc<Communicator>) -> Self {
        Self { communicator }
    }
}

#[async_trait]
impl AiTool for GetKnownAgentsTool {
    fn name(&self) -> &str {
        "get_known_agents"
    }

    fn description(&self) -> &str {
        "Returns the comma-separated names of the agents you can send messages to."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value, _ctx: &CallContext) -> Result<Value, Error> {
        Ok(json!(self.communicator.known_agents()))
    }
}
