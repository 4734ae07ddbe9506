//! The agent: one conversation, one tool set, one execution loop

use hive_common::{AgentRole, EngineConfig, HiveError, LifecycleState, Result};
use hive_llm::{ModelGateway, Turn};
use hive_tools::{AiTool, FinishTool, ToolSet};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::agents::prompt::compose_prompt;
use crate::agents::role::RoleClassifier;

/// Names of the tools the registry injects; never copied into templates
pub(crate) const FABRIC_TOOL_NAMES: &[&str] = &["get_known_agents", "send_message"];

/// Exclusive right to activate one agent, released on drop
///
/// Dropping the activation future mid-flight releases the claim too.
pub(crate) struct ActivationClaim {
    agent: Arc<Agent>,
}

impl ActivationClaim {
    pub(crate) fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }
}

impl Drop for ActivationClaim {
    fn drop(&mut self) {
        self.agent.activating.store(false, Ordering::Release);
    }
}

/// An agent wrapping a model behind a bounded tool-calling loop
pub struct Agent {
    /// Unique name, immutable after creation
    name: String,

    /// Role fixed at construction
    role: AgentRole,

    /// Shared mission of the population
    main_task: String,

    /// Role-specific instruction
    local_task: String,

    /// System prompt sent on activation
    prompt: RwLock<String>,

    /// Set once the registry's activation succeeded
    active: AtomicBool,

    /// Held by the activation in flight, see [`ActivationClaim`]
    activating: AtomicBool,

    /// Current tool snapshot; invocations clone it on entry
    pub(crate) tools: RwLock<ToolSet>,

    /// Conversation history, only locked for snapshot and append
    pub(crate) conversation: Mutex<Vec<Turn>>,

    /// Model this agent talks to
    pub(crate) gateway: Arc<dyn ModelGateway>,

    /// Loop policy
    pub(crate) engine: EngineConfig,

    /// Engine-owned completion tool
    pub(crate) finish: Arc<FinishTool>,
}

impl Agent {
    /// Start building an agent named `name`
    pub fn builder(name: impl Into<String>, gateway: Arc<dyn ModelGateway>) -> AgentBuilder {
        AgentBuilder::new(name, gateway)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn is_manager(&self) -> bool {
        self.role == AgentRole::Manager
    }

    pub fn main_task(&self) -> &str {
        &self.main_task
    }

    pub fn local_task(&self) -> &str {
        &self.local_task
    }

    pub fn state(&self) -> LifecycleState {
        if self.active.load(Ordering::Acquire) {
            LifecycleState::Active
        } else {
            LifecycleState::Passive
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    pub(crate) fn mark_active(&self) {
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn mark_passive(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Claim the right to activate this agent
    ///
    /// None if it is already active or another activation holds the claim.
    pub(crate) fn claim_activation(self: &Arc<Self>) -> Option<ActivationClaim> {
        if self.is_active() {
            return None;
        }
        self.activating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActivationClaim {
                agent: self.clone(),
            })
    }

    pub fn prompt(&self) -> String {
        self.prompt.read().clone()
    }

    /// Replace the system prompt
    pub fn set_prompt(&self, prompt: impl Into<String>) {
        *self.prompt.write() = prompt.into();
    }

    /// Append a paragraph to the system prompt
    pub fn append_prompt(&self, addition: &str) {
        let mut prompt = self.prompt.write();
        prompt.push('\n');
        prompt.push_str(addition);
    }

    /// Add a tool; returns false if the name is taken
    ///
    /// Running invocations keep the snapshot they started with.
    pub fn add_tool(&self, tool: Arc<dyn AiTool>) -> bool {
        let name = tool.name().to_string();
        let added = self.tools.write().insert(tool);
        if added {
            debug!("Agent {} gained tool '{}'", self.name, name);
        } else {
            debug!("Agent {} already has a tool named '{}'", self.name, name);
        }
        added
    }

    /// Add several tools, skipping names already present
    pub fn add_tools<I>(&self, tools: I) -> usize
    where
        I: IntoIterator<Item = Arc<dyn AiTool>>,
    {
        tools.into_iter().filter(|t| self.add_tool(t.clone())).count()
    }

    /// Snapshot of the current tool set
    pub fn tools(&self) -> ToolSet {
        self.tools.read().clone()
    }

    /// Tools an agent spawned from this one should start with
    pub fn template_tools(&self) -> ToolSet {
        self.tools().without(FABRIC_TOOL_NAMES)
    }

    /// Copy of the conversation so far
    pub fn history(&self) -> Vec<Turn> {
        self.conversation.lock().clone()
    }

    pub fn gateway(&self) -> Arc<dyn ModelGateway> {
        self.gateway.clone()
    }

    pub fn engine_config(&self) -> &EngineConfig {
        &self.engine
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("state", &self.state())
            .field("tools", &self.tools())
            .finish()
    }
}

/// Builder for [`Agent`]
pub struct AgentBuilder {
    name: String,
    gateway: Arc<dyn ModelGateway>,
    role: Option<AgentRole>,
    main_task: String,
    local_task: String,
    prompt: Option<String>,
    tools: ToolSet,
    engine: EngineConfig,
    unique_suffix: bool,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            name: name.into(),
            gateway,
            role: None,
            main_task: String::new(),
            local_task: String::new(),
            prompt: None,
            tools: ToolSet::new(),
            engine: EngineConfig::default(),
            unique_suffix: false,
        }
    }

    /// Fix the role instead of deriving it from the name
    pub fn role(mut self, role: AgentRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn main_task(mut self, main_task: impl Into<String>) -> Self {
        self.main_task = main_task.into();
        self
    }

    pub fn local_task(mut self, local_task: impl Into<String>) -> Self {
        self.local_task = local_task.into();
        self
    }

    /// Use `prompt` instead of the composed default
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn tool(mut self, tool: Arc<dyn AiTool>) -> Self {
        self.tools.insert(tool);
        self
    }

    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Append `_<8 hex>` to the name
    pub fn unique_suffix(mut self) -> Self {
        self.unique_suffix = true;
        self
    }

    /// Build with the default keyword classifier
    pub fn build(self) -> Result<Arc<Agent>> {
        self.build_with(&RoleClassifier::default())
    }

    /// Build, deriving the role with `classifier` when none was given
    pub fn build_with(self, classifier: &RoleClassifier) -> Result<Arc<Agent>> {
        if self.name.trim().is_empty() {
            return Err(HiveError::Config("Agent name must not be empty".to_string()));
        }

        let name = if self.unique_suffix {
            let id = uuid::Uuid::new_v4().simple().to_string();
            format!("{}_{}", self.name, &id[..8])
        } else {
            self.name
        };

        let role = match self.role {
            Some(role) => role,
            None => classifier.classify(&name)?,
        };

        let prompt = self
            .prompt
            .unwrap_or_else(|| compose_prompt(&self.main_task, &self.local_task));

        debug!("Built {} agent '{}' with tools {:?}", role, name, self.tools);

        Ok(Arc::new(Agent {
            name,
            role,
            main_task: self.main_task,
            local_task: self.local_task,
            prompt: RwLock::new(prompt),
            active: AtomicBool::new(false),
            activating: AtomicBool::new(false),
            tools: RwLock::new(self.tools),
            conversation: Mutex::new(Vec::new()),
            gateway: self.gateway,
            engine: self.engine,
            finish: Arc::new(FinishTool),
        }))
    }
}
