//! Agent registry supervising a population of agents

use futures::stream::{self, StreamExt};
use hive_common::{
    EngineConfig, HiveConfig, HiveError, JobKind, RegistryConfig, Result, SYSTEM_WORKER_PREFIXES,
    WEB_WORKER_PREFIXES,
};
use hive_tools::{AiTool, CallContext, ToolSet};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::agents::agent::{ActivationClaim, Agent, FABRIC_TOOL_NAMES};
use crate::agents::communication::Communicator;
use crate::agents::engine::{InvokeOutput, InvokeRequest};
use crate::agents::role::RoleClassifier;
use crate::tools::{AgentSpec, SpawnAgentsTool};

/// Outcome of a bulk activation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationReport {
    /// Agents whose activation produced a usable answer
    pub activated: Vec<String>,
    /// Agents whose activation failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl ActivationReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.activated.len() + self.failed.len()
    }
}

/// The population and every structure derived from it
///
/// Only mutated under the registry's write lock, and always rebuilt as a
/// whole, so readers never see a torn view.
#[derive(Default)]
struct Population {
    /// Insertion-ordered agents
    agents: Vec<Arc<Agent>>,
    managers: Vec<Arc<Agent>>,
    workers: Vec<Arc<Agent>>,
    /// Communicator per agent name
    communicators: HashMap<String, Arc<Communicator>>,
}

impl Population {
    fn get(&self, name: &str) -> Option<&Arc<Agent>> {
        self.agents.iter().find(|a| a.name() == name)
    }

    fn contains(&self, agent: &Arc<Agent>) -> bool {
        self.agents.iter().any(|a| Arc::ptr_eq(a, agent))
    }

    /// Re-run classification and rewire every communicator
    fn rebuild(&mut self) {
        self.managers = self.agents.iter().filter(|a| a.is_manager()).cloned().collect();
        self.workers = self.agents.iter().filter(|a| !a.is_manager()).cloned().collect();

        let agents = &self.agents;
        self.communicators.retain(|name, communicator| {
            let alive = agents.iter().any(|a| a.name() == name);
            if !alive {
                communicator.clear();
            }
            alive
        });

        for agent in &self.agents {
            let visible: Vec<Weak<Agent>> = if agent.is_manager() {
                self.workers
                    .iter()
                    .chain(self.managers.iter().filter(|m| !Arc::ptr_eq(m, agent)))
                    .map(Arc::downgrade)
                    .collect()
            } else {
                self.managers.iter().map(Arc::downgrade).collect()
            };

            let communicator = self
                .communicators
                .entry(agent.name().to_string())
                .or_insert_with(|| {
                    let communicator = Communicator::new(agent.name());
                    agent.add_tools(communicator.tools());
                    communicator
                });
            communicator.set_visible(visible);
        }

        debug!(
            "Rebuilt population: {} managers, {} workers",
            self.managers.len(),
            self.workers.len()
        );
    }

    /// First agent whose tools template a spawned agent of `job`
    fn template_for(&self, job: JobKind) -> Option<&Arc<Agent>> {
        let with_prefix = |prefixes: &[&str]| {
            self.workers.iter().find(|w| {
                let name = w.name().to_lowercase();
                prefixes.iter().any(|p| name.starts_with(p))
            })
        };
        match job {
            JobKind::Manager => self.managers.first(),
            JobKind::SystemWorker => with_prefix(SYSTEM_WORKER_PREFIXES),
            JobKind::WebWorker => with_prefix(WEB_WORKER_PREFIXES),
        }
    }
}

struct RegistryInner {
    population: RwLock<Population>,
    config: RegistryConfig,
    engine: EngineConfig,
    classifier: RoleClassifier,
}

/// Registry for supervising agents and wiring who can message whom
///
/// Cloning is cheap and yields a handle to the same population.
#[derive(Clone)]
pub struct AgentRegistry {
    inner: Arc<RegistryInner>,
}

/// Non-owning handle held by tools living inside the population
#[derive(Clone)]
pub struct WeakRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakRegistry {
    pub fn upgrade(&self) -> Option<AgentRegistry> {
        self.inner.upgrade().map(|inner| AgentRegistry { inner })
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default(), EngineConfig::default())
    }
}

impl AgentRegistry {
    /// Create a new agent registry
    pub fn new(config: RegistryConfig, engine: EngineConfig) -> Self {
        let classifier = RoleClassifier::from_config(&config);
        Self {
            inner: Arc::new(RegistryInner {
                population: RwLock::new(Population::default()),
                config,
                engine,
                classifier,
            }),
        }
    }

    pub fn from_config(config: &HiveConfig) -> Self {
        Self::new(config.registry.clone(), config.engine.clone())
    }

    /// Classifier configured with this registry's keywords
    pub fn classifier(&self) -> &RoleClassifier {
        &self.inner.classifier
    }

    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Tool letting agents grow the population
    pub fn spawn_tool(&self) -> Arc<dyn AiTool> {
        Arc::new(SpawnAgentsTool::new(self.downgrade()))
    }

    fn root_context(&self) -> CallContext {
        CallContext::root(self.inner.engine.max_call_depth)
    }

    /// Register an agent; false if its name is taken
    pub async fn add_agent(&self, agent: Arc<Agent>) -> bool {
        self.add_agents(vec![agent]).await
    }

    /// Register a batch of agents atomically; nothing is added on conflict
    pub async fn add_agents(&self, batch: Vec<Arc<Agent>>) -> bool {
        let mut population = self.inner.population.write().await;

        let mut names = HashSet::new();
        for agent in &batch {
            if population.get(agent.name()).is_some() || !names.insert(agent.name()) {
                error!("Agent {} is already registered", agent.name());
                return false;
            }
        }

        for agent in &batch {
            info!("Registering {} agent {}", agent.role(), agent.name());
        }
        population.agents.extend(batch);
        population.rebuild();
        true
    }

    /// Remove an agent; false if it is not registered
    pub async fn remove_agent(&self, agent: &Arc<Agent>) -> bool {
        self.remove_where(|a| Arc::ptr_eq(a, agent), agent.name())
            .await
    }

    /// Remove the agent named `name`; false if there is none
    pub async fn remove_agent_by_name(&self, name: &str) -> bool {
        self.remove_where(|a| a.name() == name, name).await
    }

    async fn remove_where<F>(&self, matches: F, label: &str) -> bool
    where
        F: Fn(&Arc<Agent>) -> bool,
    {
        let mut population = self.inner.population.write().await;
        let Some(index) = population.agents.iter().position(|a| matches(a)) else {
            error!("Cannot remove {}: no such agent", label);
            return false;
        };

        let agent = population.agents.remove(index);
        population.rebuild();
        drop(population);

        // Back to a fresh passive agent, detached from the fabric
        {
            let mut tools = agent.tools.write();
            *tools = tools.without(FABRIC_TOOL_NAMES);
        }
        agent.conversation.lock().clear();
        agent.mark_passive();
        info!("Removed agent {}", agent.name());
        true
    }

    /// All agents in registration order
    pub async fn agents(&self) -> Vec<Arc<Agent>> {
        self.inner.population.read().await.agents.clone()
    }

    pub async fn managers(&self) -> Vec<Arc<Agent>> {
        self.inner.population.read().await.managers.clone()
    }

    pub async fn workers(&self) -> Vec<Arc<Agent>> {
        self.inner.population.read().await.workers.clone()
    }

    pub async fn passive_agents(&self) -> Vec<Arc<Agent>> {
        let population = self.inner.population.read().await;
        population.agents.iter().filter(|a| !a.is_active()).cloned().collect()
    }

    pub async fn active_agents(&self) -> Vec<Arc<Agent>> {
        let population = self.inner.population.read().await;
        population.agents.iter().filter(|a| a.is_active()).cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Agent>> {
        self.inner.population.read().await.get(name).cloned()
    }

    pub async fn names(&self) -> Vec<String> {
        let population = self.inner.population.read().await;
        population.agents.iter().map(|a| a.name().to_string()).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.population.read().await.agents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn communicator(&self, name: &str) -> Option<Arc<Communicator>> {
        self.inner.population.read().await.communicators.get(name).cloned()
    }

    /// Names `name` may message, or None if it is not registered
    pub async fn visible_to(&self, name: &str) -> Option<Vec<String>> {
        self.communicator(name).await.map(|c| c.visible_names())
    }

    /// Activate one agent with its own prompt
    pub async fn activate(&self, agent: &Arc<Agent>, attachments: Vec<PathBuf>) -> bool {
        self.activate_in(agent, attachments, &self.root_context()).await
    }

    pub async fn activate_by_name(&self, name: &str, attachments: Vec<PathBuf>) -> bool {
        match self.get(name).await {
            Some(agent) => self.activate(&agent, attachments).await,
            None => {
                error!("Cannot activate {}: no such agent", name);
                false
            }
        }
    }

    /// Activate one agent inside an existing call chain
    ///
    /// Returns true only if this call moved the agent to active. Already
    /// active agents are left alone.
    pub async fn activate_in(
        &self,
        agent: &Arc<Agent>,
        attachments: Vec<PathBuf>,
        ctx: &CallContext,
    ) -> bool {
        let name = agent.name().to_string();
        if !self.inner.population.read().await.contains(agent) {
            error!("Cannot activate {}: agent is not registered", name);
            return false;
        }
        if agent.is_active() {
            info!("Agent {} is already active", name);
            return false;
        }
        let Some(_claim) = agent.claim_activation() else {
            info!("Agent {} is already being activated", name);
            return false;
        };

        let request = InvokeRequest::new(agent.prompt())
            .attachments(attachments)
            .silent();
        let result = agent.invoke_in(request, ctx).await;

        match result {
            Ok(output) if output.is_truthy() => {
                agent.mark_active();
                info!("Agent {} is active", name);
                true
            }
            Ok(output) => {
                warn!("Activation of {} produced no usable output: {}", name, output);
                false
            }
            Err(e) => {
                error!("Activation of {} failed: {}", name, e);
                false
            }
        }
    }

    /// Activate every passive agent concurrently
    ///
    /// Returns once every activation has completed. All attempted agents are
    /// moved to active; failures are listed in the report.
    pub async fn activate_all(
        &self,
        attachments: HashMap<String, Vec<PathBuf>>,
    ) -> ActivationReport {
        self.activate_all_in(attachments, &self.root_context()).await
    }

    pub async fn activate_all_in(
        &self,
        attachments: HashMap<String, Vec<PathBuf>>,
        ctx: &CallContext,
    ) -> ActivationReport {
        let passive = {
            let population = self.inner.population.read().await;
            population
                .agents
                .iter()
                .filter(|a| !a.is_active())
                .cloned()
                .collect::<Vec<_>>()
        };
        self.activate_batch(passive, attachments, ctx).await
    }

    async fn activate_batch(
        &self,
        agents: Vec<Arc<Agent>>,
        attachments: HashMap<String, Vec<PathBuf>>,
        ctx: &CallContext,
    ) -> ActivationReport {
        let claims = {
            let population = self.inner.population.read().await;
            agents
                .iter()
                .filter(|a| population.contains(a))
                .filter_map(|a| a.claim_activation())
                .collect::<Vec<_>>()
        };

        info!("Activating {} agents", claims.len());
        let parallelism = self.inner.config.max_parallel_activations.max(1);
        let results = stream::iter(claims.into_iter().map(|claim| {
            let attachments = attachments
                .get(claim.agent().name())
                .cloned()
                .unwrap_or_default();
            async move {
                let agent = claim.agent();
                let request = InvokeRequest::new(agent.prompt())
                    .attachments(attachments)
                    .silent();
                let result = agent.invoke_in(request, ctx).await;
                (claim, result)
            }
        }))
        .buffer_unordered(parallelism)
        .collect::<Vec<(ActivationClaim, Result<InvokeOutput>)>>()
        .await;

        let mut report = ActivationReport::default();
        for (claim, result) in results {
            let agent = claim.agent();
            let name = agent.name().to_string();
            agent.mark_active();
            match result {
                Ok(output) if output.is_truthy() => report.activated.push(name),
                Ok(output) => {
                    warn!("Activation of {} produced no usable output", name);
                    report.failed.push((name, output.text()));
                }
                Err(e) => {
                    error!("Activation of {} failed: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        info!(
            "Activation finished: {} succeeded, {} failed",
            report.activated.len(),
            report.failed.len()
        );
        report
    }

    /// Build, register and activate agents described by `specs`
    ///
    /// The whole batch is rejected if any agent cannot be built or
    /// registered. Returns the names of the new agents.
    pub async fn spawn_agents(
        &self,
        specs: &[AgentSpec],
        main_task: &str,
        ctx: &CallContext,
    ) -> Result<(Vec<String>, ActivationReport)> {
        if specs.is_empty() {
            return Err(HiveError::Config("Amount of agents can't be 0".to_string()));
        }

        let batch = {
            let population = self.inner.population.read().await;
            let fallback = ctx
                .current_agent()
                .and_then(|name| population.get(name))
                .or_else(|| population.agents.first())
                .cloned()
                .ok_or_else(|| {
                    HiveError::Routing("Cannot spawn agents into an empty registry".to_string())
                })?;

            let mut batch = Vec::with_capacity(specs.len());
            for spec in specs {
                let template = population.template_for(spec.job);
                let tools = match (template, spec.job) {
                    (Some(template), _) => template.template_tools(),
                    (None, JobKind::Manager) => {
                        return Err(HiveError::Config(
                            "No manager agent to copy tools from".to_string(),
                        ));
                    }
                    (None, job) => {
                        warn!("No template agent for job {}; spawning without tools", job);
                        ToolSet::new()
                    }
                };
                let source = template.unwrap_or(&fallback);

                let agent = Agent::builder(&spec.name, source.gateway())
                    .unique_suffix()
                    .role(spec.job.role())
                    .main_task(main_task)
                    .local_task(&spec.task)
                    .tools(tools)
                    .engine_config(source.engine_config().clone())
                    .build_with(&self.inner.classifier)?;
                batch.push(agent);
            }
            batch
        };

        let names = batch.iter().map(|a| a.name().to_string()).collect::<Vec<_>>();
        if !self.add_agents(batch.clone()).await {
            return Err(HiveError::Routing(format!(
                "Failed to register agents {}",
                names.join(", ")
            )));
        }
        info!("Spawned agents: {}", names.join(", "));

        let report = self.activate_batch(batch, HashMap::new(), ctx).await;
        Ok((names, report))
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::{ScriptedGateway, finish_call};
    use hive_common::LifecycleState;
    use hive_llm::AssistantTurn;

    fn agent(name: &str, script: Vec<AssistantTurn>) -> Arc<Agent> {
        Agent::builder(name, ScriptedGateway::new(script))
            .build()
            .unwrap()
    }

    fn finishing(message: &str) -> Vec<AssistantTurn> {
        vec![AssistantTurn::with_calls(vec![finish_call("c1", message)])]
    }

    async fn assert_visibility(registry: &AgentRegistry) {
        let managers = registry.managers().await;
        let workers = registry.workers().await;
        for m in &managers {
            let mut expected: Vec<String> = workers.iter().map(|w| w.name().to_string()).collect();
            expected.extend(
                managers
                    .iter()
                    .filter(|o| o.name() != m.name())
                    .map(|o| o.name().to_string()),
            );
            let mut visible = registry.visible_to(m.name()).await.unwrap();
            visible.sort();
            expected.sort();
            assert_eq!(visible, expected, "manager {}", m.name());
        }
        for w in &workers {
            let mut expected: Vec<String> = managers.iter().map(|m| m.name().to_string()).collect();
            let mut visible = registry.visible_to(w.name()).await.unwrap();
            visible.sort();
            expected.sort();
            assert_eq!(visible, expected, "worker {}", w.name());
        }
    }

    #[tokio::test]
    async fn test_add_remove_keep_visibility_consistent() {
        let registry = AgentRegistry::default();
        for name in ["supervisor", "lead_planner", "os_worker", "web_worker"] {
            assert!(registry.add_agent(agent(name, vec![])).await);
            assert_visibility(&registry).await;
        }

        assert!(registry.remove_agent_by_name("lead_planner").await);
        assert_visibility(&registry).await;
        assert!(registry.visible_to("lead_planner").await.is_none());

        let web = registry.get("web_worker").await.unwrap();
        assert!(registry.remove_agent(&web).await);
        assert_visibility(&registry).await;
        assert_eq!(registry.names().await, vec!["supervisor", "os_worker"]);
    }

    #[tokio::test]
    async fn test_duplicates_and_unknown_removals_fail() {
        let registry = AgentRegistry::default();
        assert!(registry.add_agent(agent("os_worker", vec![])).await);
        assert!(!registry.add_agent(agent("os_worker", vec![])).await);
        assert!(!registry.remove_agent_by_name("ghost").await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_fabric_tools_injected_once() {
        let registry = AgentRegistry::default();
        let worker = agent("os_worker", vec![]);
        registry.add_agent(worker.clone()).await;
        registry.add_agent(agent("supervisor", vec![])).await;

        assert_eq!(worker.tools().names(), vec!["get_known_agents", "send_message"]);

        registry.remove_agent(&worker).await;
        assert!(worker.tools().is_empty());
    }

    #[tokio::test]
    async fn test_activate_moves_agent_to_active() {
        let registry = AgentRegistry::default();
        let worker = agent("os_worker", finishing("ready"));
        registry.add_agent(worker.clone()).await;

        assert!(registry.activate(&worker, vec![]).await);
        assert_eq!(worker.state(), LifecycleState::Active);
        assert_eq!(registry.active_agents().await.len(), 1);
        assert!(worker.history()[0].text().contains("=== MAIN TASK ==="));

        // Second activation is a reported no-op
        assert!(!registry.activate(&worker, vec![]).await);
        assert_eq!(worker.history().len(), 3);
    }

    #[tokio::test]
    async fn test_activate_unknown_or_falsy() {
        let registry = AgentRegistry::default();
        let stranger = agent("os_worker", finishing("ready"));
        assert!(!registry.activate(&stranger, vec![]).await);
        assert!(!registry.activate_by_name("nobody", vec![]).await);

        let mute = agent("web_worker", vec![AssistantTurn::text("")]);
        registry.add_agent(mute.clone()).await;
        assert!(!registry.activate(&mute, vec![]).await);
        assert_eq!(mute.state(), LifecycleState::Passive);
    }

    #[tokio::test]
    async fn test_activate_all_reports_and_clears_passive_set() {
        let registry = AgentRegistry::default();
        registry.add_agent(agent("supervisor", finishing("planned"))).await;
        registry.add_agent(agent("os_worker", finishing("ready"))).await;
        registry.add_agent(agent("web_worker", vec![])).await;

        let report = registry.activate_all(HashMap::new()).await;

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.activated.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "web_worker");
        assert!(registry.passive_agents().await.is_empty());

        let again = registry.activate_all(HashMap::new()).await;
        assert_eq!(again.attempted(), 0);
    }

    #[tokio::test]
    async fn test_spawn_tool_holds_weak_handle() {
        let registry = AgentRegistry::default();
        let weak = registry.downgrade();
        assert!(weak.upgrade().is_some());
        let tool = registry.spawn_tool();
        drop(registry);
        assert!(weak.upgrade().is_none());
        assert_eq!(tool.name(), "create_agents_for_work");
    }
}
