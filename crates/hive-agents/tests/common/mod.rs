#![allow(dead_code)]

use async_trait::async_trait;
use hive_common::{HiveError, Result};
use hive_llm::{AssistantTurn, ModelGateway, ToolCallRequest, ToolSchema, Turn};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Gateway replaying a script; errors once the script runs out
pub struct ScriptedGateway {
    script: Mutex<VecDeque<AssistantTurn>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    seen: Mutex<Vec<Vec<Turn>>>,
    offered: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<AssistantTurn>) -> Arc<Self> {
        Self::build(script, None)
    }

    /// Gateway sleeping `delay` before each answer
    pub fn slow(script: Vec<AssistantTurn>, delay: Duration) -> Arc<Self> {
        Self::build(script, Some(delay))
    }

    fn build(script: Vec<AssistantTurn>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most requests ever awaiting an answer at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Conversations received, oldest first
    pub fn seen(&self) -> Vec<Vec<Turn>> {
        self.seen.lock().clone()
    }

    /// Tool names offered on the latest request
    pub fn offered_tools(&self) -> Vec<String> {
        self.offered.lock().clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn send(
        &self,
        conversation: &[Turn],
        _temperature: f64,
        tools: &[ToolSchema],
    ) -> Result<AssistantTurn> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(conversation.to_vec());
        *self.offered.lock() = tools.iter().map(|t| t.name.clone()).collect();

        if let Some(delay) = self.delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        self.script
            .lock()
            .pop_front()
            .ok_or_else(|| HiveError::Gateway("script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> AssistantTurn {
    AssistantTurn::with_calls(vec![ToolCallRequest::new(id, name, arguments)])
}

pub fn finish(id: &str, message: &str) -> AssistantTurn {
    tool_call(id, "finish", json!({ "message": message }))
}

pub fn send(id: &str, to: &str, message: &str) -> AssistantTurn {
    tool_call(
        id,
        "send_message",
        json!({ "to": to, "type": "task", "message": message }),
    )
}

/// Texts of the tool-result turns of `turns`
pub fn tool_results(turns: &[Turn]) -> Vec<String> {
    turns
        .iter()
        .filter_map(|t| match t {
            Turn::ToolResult { content, .. } => Some(content.clone()),
            _ => None,
        })
        .collect()
}

/// Gateway that never answers
pub struct StalledGateway;

#[async_trait]
impl ModelGateway for StalledGateway {
    async fn send(
        &self,
        _conversation: &[Turn],
        _temperature: f64,
        _tools: &[ToolSchema],
    ) -> Result<AssistantTurn> {
        std::future::pending::<()>().await;
        Err(HiveError::Gateway("unreachable".to_string()))
    }

    fn model_name(&self) -> &str {
        "stalled"
    }
}
