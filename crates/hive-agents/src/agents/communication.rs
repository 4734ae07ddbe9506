//! Communication primitives for agent messaging

use hive_tools::{AiTool, CallContext};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::{info, warn};

use crate::agents::agent::Agent;
use crate::agents::engine::InvokeRequest;
use crate::tools::{GetKnownAgentsTool, SendMessageTool};

/// Returned by `get_known_agents` when nobody is visible
pub const NO_KNOWN_AGENTS: &str = "No known agents.";

/// A message sent between agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Name of the sending agent
    pub from: String,

    /// Name of the receiving agent
    pub to: String,

    /// Free-form message type, e.g. "task" or "question"
    pub kind: String,

    /// Message content
    pub message: String,
}

impl Envelope {
    /// Text handed to the receiving agent
    pub fn render(&self) -> String {
        format!("Message: [{}] {}: {}", self.kind, self.from, self.message)
    }
}

/// Per-agent messaging facade
///
/// Holds weak references to the agents its owner may address. The registry
/// replaces the visible set whenever the population changes.
pub struct Communicator {
    owner: String,
    visible: RwLock<Vec<Weak<Agent>>>,
}

impl Communicator {
    pub fn new(owner: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            owner: owner.into(),
            visible: RwLock::new(Vec::new()),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The two tools exposed to the owning agent
    pub fn tools(self: &Arc<Self>) -> Vec<Arc<dyn AiTool>> {
        vec![
            Arc::new(GetKnownAgentsTool::new(self.clone())),
            Arc::new(SendMessageTool::new(self.clone())),
        ]
    }

    pub(crate) fn set_visible(&self, agents: Vec<Weak<Agent>>) {
        *self.visible.write() = agents;
    }

    pub(crate) fn clear(&self) {
        self.visible.write().clear();
    }

    /// Names of the agents this communicator can reach
    pub fn visible_names(&self) -> Vec<String> {
        self.visible
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|agent| agent.name().to_string())
            .collect()
    }

    /// Comma-joined visible names, or the "none" sentinel
    pub fn known_agents(&self) -> String {
        let names = self.visible_names();
        if names.is_empty() {
            NO_KNOWN_AGENTS.to_string()
        } else {
            names.join(", ")
        }
    }

    fn resolve(&self, name: &str) -> Option<Arc<Agent>> {
        self.visible
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .find(|agent| agent.name() == name)
    }

    /// Deliver `message` to `to` and wait for its answer
    ///
    /// Never fails: routing problems and failures of the target come back
    /// as an error string.
    pub async fn send(&self, to: &str, kind: &str, message: &str, ctx: &CallContext) -> String {
        if to == self.owner {
            return format!("[{}] Skipped self-message.", self.owner);
        }

        let Some(target) = self.resolve(to) else {
            warn!("{} tried to message unknown agent '{}'", self.owner, to);
            return format!(
                "send_message error: agent '{}' is not known to {}. Known agents: {}",
                to,
                self.owner,
                self.known_agents()
            );
        };

        let envelope = Envelope {
            from: self.owner.clone(),
            to: to.to_string(),
            kind: kind.to_string(),
            message: message.to_string(),
        };
        info!("[{}] {} → {}: {}", envelope.kind, envelope.from, envelope.to, envelope.message);

        match target
            .invoke_in(InvokeRequest::new(envelope.render()).silent(), ctx)
            .await
        {
            Ok(output) => {
                info!("{} answered {}", to, self.owner);
                format!("[{}] → {}:\n{}", to, self.owner, output.text())
            }
            Err(e) => {
                if !e.is_recursion() {
                    warn!("Message from {} to {} failed: {}", self.owner, to, e);
                }
                format!("send_message error: {}", e)
            }
        }
    }
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("owner", &self.owner)
            .field("visible", &self.visible_names())
            .finish()
    }
}
