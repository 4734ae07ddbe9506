use anyhow::Error;
use async_trait::async_trait;
use hive_common::JobKind;
use hive_tools::{AiTool, CallContext};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::agents::registry::WeakRegistry;

const ENTRY_EXAMPLE: &str =
    r#"{"name": "researcher", "task": "Collect sources", "job": "manager" | "system_worker" | "web_worker"}"#;

/// One agent requested through `create_agents_for_work`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub task: String,
    pub job: JobKind,
}

impl AgentSpec {
    /// Parse one entry of the `agents` list
    fn parse(index: usize, value: &Value) -> Result<Self, String> {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    format!(
                        "Wrong format of agent #{}: missing '{}'. Example: {}",
                        index + 1,
                        key,
                        ENTRY_EXAMPLE
                    )
                })
        };

        let name = field("name")?;
        let task = field("task")?;
        let job = field("job")?
            .parse::<JobKind>()
            .map_err(|e| format!("Wrong format of agent #{}: {}", index + 1, e))?;

        Ok(Self {
            name: name.to_string(),
            task: task.to_string(),
            job,
        })
    }
}

/// Lets an agent delegate work to newly created agents
pub struct SpawnAgentsTool {
    registry: WeakRegistry,
}

impl SpawnAgentsTool {
    pub fn new(registry: WeakRegistry) -> Self {
        Self { registry }
    }

    /// Validate the whole request before anything is built
    fn parse(params: &Value) -> Result<(Vec<AgentSpec>, String), String> {
        let agents = params
            .get("agents")
            .and_then(|v| v.as_array())
            .ok_or_else(|| format!("'agents' must be a list like [{}]", ENTRY_EXAMPLE))?;
        if agents.is_empty() {
            return Err("Amount of agents can't be 0.".to_string());
        }

        let main_task = params
            .get("main_task")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "Missing 'main_task': describe the overall goal".to_string())?;

        let specs = agents
            .iter()
            .enumerate()
            .map(|(i, v)| AgentSpec::parse(i, v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((specs, main_task.to_string()))
    }

    fn rejected(message: impl Into<String>, params: &Value) -> Value {
        let message = message.into();
        warn!("Rejected agent creation: {}", message);
        json!({
            "status": "rejected",
            "message": message,
            "agents": params.get("agents").cloned().unwrap_or(Value::Null),
        })
    }
}

#[async_trait]
impl AiTool for SpawnAgentsTool {
    fn name(&self) -> &str {
        "create_agents_for_work"
    }

    fn description(&self) -> &str {
        r#"Creates new agents, registers them and activates them.
Parameters:
- `agents`: List of {"name", "task", "job"} objects. `job` is one of "manager", "system_worker" (shell and files) or "web_worker" (web pages).
- `main_task`: The overall goal shared by the new agents.

Returns the status and the final names of the created agents. Use `get_known_agents` afterwards to message them.
"#
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "agents": {
                    "type": "array",
                    "description": "Agents to create",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Base name of the agent"},
                            "task": {"type": "string", "description": "Role-specific instruction"},
                            "job": {
                                "type": "string",
                                "enum": ["manager", "system_worker", "web_worker"],
                                "description": "Which existing agent's tools to copy"
                            }
                        },
                        "required": ["name", "task", "job"]
                    }
                },
                "main_task": {
                    "type": "string",
                    "description": "Overall goal shared by the new agents"
                }
            },
            "required": ["agents", "main_task"]
        })
    }

    async fn execute(&self, params: Value, ctx: &CallContext) -> Result<Value, Error> {
        let (specs, main_task) = match Self::parse(&params) {
            Ok(parsed) => parsed,
            Err(message) => return Ok(Self::rejected(message, &params)),
        };

        let Some(registry) = self.registry.upgrade() else {
            return Ok(Self::rejected("The agent registry is no longer running", &params));
        };

        match registry.spawn_agents(&specs, &main_task, ctx).await {
            Ok((names, report)) => {
                info!("Delegated work to {} new agents", names.len());
                let mut message = format!(
                    "Task delegated to {} agents; use 'get_known_agents' to list them",
                    names.len()
                );
                if !report.all_succeeded() {
                    let failed = report
                        .failed
                        .iter()
                        .map(|(name, reason)| format!("{} ({})", name, reason))
                        .collect::<Vec<_>>()
                        .join(", ");
                    message.push_str(&format!(". Activation failed for: {}", failed));
                }
                Ok(json!({
                    "status": "accepted",
                    "message": message,
                    "agents": names,
                }))
            }
            Err(e) => Ok(Self::rejected(e.to_string(), &params)),
        }
    }
}
