//! Throwaway agents for single questions

use hive_common::{EngineConfig, Result};
use hive_llm::ModelGateway;
use hive_tools::ToolSet;
use std::sync::Arc;

use crate::agents::agent::Agent;
use crate::agents::engine::{InvokeOutput, InvokeRequest};

/// Run `request` on a fresh agent that is dropped afterwards
///
/// The agent only has `tools` plus `finish`, an empty history, and `request`
/// as its sole input; no prompt is sent.
pub async fn run_once_agent(
    gateway: Arc<dyn ModelGateway>,
    request: InvokeRequest,
    tools: ToolSet,
    engine: EngineConfig,
) -> Result<InvokeOutput> {
    let agent = Agent::builder("one_shot_worker", gateway)
        .role(hive_common::AgentRole::Worker)
        .tools(tools)
        .engine_config(engine)
        .unique_suffix()
        .build()?;
    agent.invoke(request).await
}
