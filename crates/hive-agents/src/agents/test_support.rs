//! Mock gateway and tools shared by unit tests

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use hive_common::{HiveError, Result};
use hive_llm::{AssistantTurn, ModelGateway, ToolCallRequest, ToolSchema, Turn};
use hive_tools::{AiTool, CallContext};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Gateway replaying a fixed script of assistant turns
pub(crate) struct ScriptedGateway {
    script: Mutex<VecDeque<AssistantTurn>>,
    repeat: Option<AssistantTurn>,
    calls: AtomicUsize,
    last_conversation: Mutex<Vec<Turn>>,
    last_temperature: Mutex<f64>,
}

impl ScriptedGateway {
    pub(crate) fn new(script: Vec<AssistantTurn>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            repeat: None,
            calls: AtomicUsize::new(0),
            last_conversation: Mutex::new(Vec::new()),
            last_temperature: Mutex::new(0.0),
        })
    }

    /// Gateway answering every request with `turn`
    pub(crate) fn repeating(turn: AssistantTurn) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(turn),
            calls: AtomicUsize::new(0),
            last_conversation: Mutex::new(Vec::new()),
            last_temperature: Mutex::new(0.0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_conversation(&self) -> Vec<Turn> {
        self.last_conversation.lock().clone()
    }

    pub(crate) fn last_temperature(&self) -> f64 {
        *self.last_temperature.lock()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn send(
        &self,
        conversation: &[Turn],
        temperature: f64,
        _tools: &[ToolSchema],
    ) -> Result<AssistantTurn> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_conversation.lock() = conversation.to_vec();
        *self.last_temperature.lock() = temperature;

        if let Some(turn) = self.script.lock().pop_front() {
            return Ok(turn);
        }
        self.repeat
            .clone()
            .ok_or_else(|| HiveError::Gateway("script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Tool returning a fixed string
pub(crate) struct StaticTool {
    name: &'static str,
    output: &'static str,
}

impl StaticTool {
    pub(crate) fn arc(name: &'static str, output: &'static str) -> Arc<dyn AiTool> {
        Arc::new(Self { name, output })
    }
}

#[async_trait]
impl AiTool for StaticTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.output
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value, _ctx: &CallContext) -> std::result::Result<Value, Error> {
        Ok(json!(self.output))
    }
}

/// Tool that always fails
pub(crate) struct FailingTool(pub(crate) &'static str);

#[async_trait]
impl AiTool for FailingTool {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value, _ctx: &CallContext) -> std::result::Result<Value, Error> {
        Err(anyhow!("disk on fire"))
    }
}

/// Tool that never completes
pub(crate) struct PendingTool(pub(crate) &'static str);

#[async_trait]
impl AiTool for PendingTool {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "Never returns"
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _params: Value, _ctx: &CallContext) -> std::result::Result<Value, Error> {
        std::future::pending::<()>().await;
        Ok(Value::Null)
    }
}

pub(crate) fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest::new(id, name, arguments)
}

pub(crate) fn finish_call(id: &str, message: &str) -> ToolCallRequest {
    call(id, "finish", json!({ "message": message }))
}
