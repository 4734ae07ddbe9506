//! Snapshot tool sets owned by agents

use hive_common::FINISH_TOOL_NAME;
use hive_llm::ToolSchema;
use std::sync::Arc;
use tracing::debug;

use crate::base::AiTool;

/// An immutable, cheaply clonable set of tools keyed by unique name
///
/// Cloning yields a snapshot. `insert` copies on write, so a snapshot taken
/// by a running invocation never observes later additions.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Arc<Vec<Arc<dyn AiTool>>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, dropping duplicate and reserved names
    pub fn from_tools<I>(tools: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn AiTool>>,
    {
        let mut set = Self::new();
        for tool in tools {
            set.insert(tool);
        }
        set
    }

    /// Add a tool; a duplicate or reserved name leaves the set unchanged
    pub fn insert(&mut self, tool: Arc<dyn AiTool>) -> bool {
        if tool.name() == FINISH_TOOL_NAME {
            debug!("Refusing to shadow the reserved '{}' tool", FINISH_TOOL_NAME);
            return false;
        }
        if self.contains(tool.name()) {
            return false;
        }
        Arc::make_mut(&mut self.tools).push(tool);
        true
    }

    /// Copy of this set without the named tools
    pub fn without(&self, names: &[&str]) -> Self {
        let kept = self
            .tools
            .iter()
            .filter(|tool| !names.contains(&tool.name()))
            .cloned()
            .collect::<Vec<_>>();
        Self {
            tools: Arc::new(kept),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AiTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.to_schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
