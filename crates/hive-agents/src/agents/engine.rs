//! The bounded tool-calling loop

use hive_common::{FINISH_TOOL_NAME, HiveError, Result};
use hive_llm::{ToolCallRequest, Turn};
use hive_tools::{AiTool, CallContext, FinishTool, ToolSet, render_tool_output};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agents::agent::Agent;
use crate::agents::attachments::human_turn;

/// Input of one invocation
#[derive(Debug, Clone, Default)]
pub struct InvokeRequest {
    pub content: String,
    pub attachments: Vec<PathBuf>,
    /// Falls back to the agent's default temperature
    pub temperature: Option<f64>,
    /// Return the invocation's turns instead of a text
    pub raw_output: bool,
    /// Log input and output at debug level only
    pub silent: bool,
}

impl InvokeRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn attachments(mut self, attachments: Vec<PathBuf>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw_output = true;
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// Result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeOutput {
    /// `finish` was called with this message
    Finished(String),
    /// Newest tool result or assistant text
    Text(String),
    /// Turns appended by this invocation
    History(Vec<Turn>),
    /// Nothing usable was produced; carries the configured fallback text
    NoUsableOutput(String),
}

impl InvokeOutput {
    /// Whether the output counts as a successful answer
    pub fn is_truthy(&self) -> bool {
        match self {
            InvokeOutput::Finished(text) | InvokeOutput::Text(text) => !text.is_empty(),
            InvokeOutput::History(turns) => !turns.is_empty(),
            InvokeOutput::NoUsableOutput(_) => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, InvokeOutput::Finished(_))
    }

    /// Text form; histories render one `[role]: text` line per turn
    pub fn text(&self) -> String {
        match self {
            InvokeOutput::Finished(text)
            | InvokeOutput::Text(text)
            | InvokeOutput::NoUsableOutput(text) => text.clone(),
            InvokeOutput::History(turns) => turns
                .iter()
                .map(|turn| format!("[{}]: {}", turn.role(), turn.text()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl fmt::Display for InvokeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// A tool call resolved against the engine and the agent's snapshot
enum ResolvedTool {
    Finish(Arc<FinishTool>),
    Host(Arc<dyn AiTool>),
}

impl Agent {
    /// Invoke the agent as a top-level call
    pub async fn invoke(&self, request: InvokeRequest) -> Result<InvokeOutput> {
        let ctx = CallContext::root(self.engine.max_call_depth);
        self.invoke_in(request, &ctx).await
    }

    /// Invoke the agent inside an existing call chain
    ///
    /// Fails only when the gateway fails, the call is cancelled, or entering
    /// this agent would close a cycle or exceed the depth limit.
    pub async fn invoke_in(&self, request: InvokeRequest, ctx: &CallContext) -> Result<InvokeOutput> {
        let ctx = ctx.enter(self.name()).map_err(|e| {
            error!("Refusing to invoke {}: {}", self.name(), e);
            e
        })?;
        if ctx.is_cancelled() {
            return Err(HiveError::Cancelled);
        }

        let tools = self.tools();
        let mut schemas = tools.schemas();
        schemas.push(self.finish.to_schema());
        let temperature = request
            .temperature
            .unwrap_or(self.engine.default_temperature);

        if request.silent {
            debug!("--- {} ➔ INPUT ---\n{}", self.name(), request.content);
        } else {
            info!("--- {} ➔ INPUT ---\n{}", self.name(), request.content);
        }

        let human = human_turn(&request.content, &request.attachments).await;
        let mut working = {
            let mut conversation = self.conversation.lock();
            conversation.push(human.clone());
            conversation.clone()
        };
        let mut transcript = vec![human];

        let mut finished: Option<String> = None;
        let mut rounds = 0;
        let mut capped = true;

        while rounds < self.engine.max_rounds {
            rounds += 1;
            debug!("{} round {} with {} turns", self.name(), rounds, working.len());

            let reply = tokio::select! {
                biased;
                _ = ctx.cancel_token().cancelled() => return Err(HiveError::Cancelled),
                reply = self.gateway.send(&working, temperature, &schemas) => reply?,
            };

            let calls = reply.tool_calls.clone();
            self.record(&mut working, &mut transcript, Turn::assistant(reply));

            if calls.is_empty() {
                capped = false;
                break;
            }

            for call in &calls {
                let content = if finished.is_some() {
                    format!(
                        "[SKIPPED] '{}' was not run because the task was already finished",
                        call.tool_name
                    )
                } else {
                    self.run_tool(&tools, call, &ctx, &mut finished).await?
                };
                self.record(
                    &mut working,
                    &mut transcript,
                    Turn::tool_result(&call.call_id, &call.tool_name, content),
                );
            }

            if finished.is_some() {
                capped = false;
                break;
            }
        }

        if capped {
            warn!(
                "{} hit the limit of {} rounds; returning best-effort output",
                self.name(),
                self.engine.max_rounds
            );
        }

        let output = select_output(
            finished,
            request.raw_output,
            &transcript,
            &self.engine.no_output_text,
        );

        if request.silent {
            debug!("--- {} ➔ OUTPUT ---\n{}", self.name(), output);
        } else {
            info!("--- {} ➔ OUTPUT ---\n{}", self.name(), output);
        }
        Ok(output)
    }

    /// Run one tool call; only cancellation escapes as an error
    async fn run_tool(
        &self,
        tools: &ToolSet,
        call: &ToolCallRequest,
        ctx: &CallContext,
        finished: &mut Option<String>,
    ) -> Result<String> {
        debug!("{} calls '{}' with {}", self.name(), call.tool_name, call.arguments);

        let tool = match self.resolve(tools, &call.tool_name) {
            Some(tool) => tool,
            None => {
                warn!("{} requested unknown tool '{}'", self.name(), call.tool_name);
                return Ok(format!("[ERROR] Tool '{}' not found.", call.tool_name));
            }
        };

        let result = match tool {
            ResolvedTool::Finish(finish) => match FinishTool::message(&call.arguments) {
                Ok(message) => {
                    *finished = Some(message);
                    finish.execute(call.arguments.clone(), ctx).await
                }
                Err(e) => Err(e),
            },
            ResolvedTool::Host(tool) => {
                tokio::select! {
                    biased;
                    _ = ctx.cancel_token().cancelled() => return Err(HiveError::Cancelled),
                    result = tool.execute(normalize_arguments(&call.arguments), ctx) => result,
                }
            }
        };

        Ok(match result {
            Ok(value) => render_tool_output(&value),
            Err(e) => {
                warn!("Tool '{}' failed for {}: {}", call.tool_name, self.name(), e);
                format!("[ERROR] Tool execution failed: {}", e)
            }
        })
    }

    fn resolve(&self, tools: &ToolSet, name: &str) -> Option<ResolvedTool> {
        if name == FINISH_TOOL_NAME {
            return Some(ResolvedTool::Finish(self.finish.clone()));
        }
        tools.get(name).map(ResolvedTool::Host)
    }

    /// Append a turn to the shared conversation and both local views
    fn record(&self, working: &mut Vec<Turn>, transcript: &mut Vec<Turn>, turn: Turn) {
        self.conversation.lock().push(turn.clone());
        working.push(turn.clone());
        transcript.push(turn);
    }
}

/// Missing arguments arrive as null; tools expect an object
fn normalize_arguments(arguments: &Value) -> Value {
    match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    }
}

/// Pick the output of a finished loop
///
/// `finish` wins, then raw history, then the newest tool result or non-empty
/// assistant text of this invocation.
fn select_output(
    finished: Option<String>,
    raw_output: bool,
    transcript: &[Turn],
    no_output_text: &str,
) -> InvokeOutput {
    if let Some(message) = finished {
        return InvokeOutput::Finished(message);
    }
    if raw_output {
        return InvokeOutput::History(transcript.to_vec());
    }

    transcript
        .iter()
        .rev()
        .find_map(|turn| match turn {
            Turn::ToolResult { content, .. } => Some(content.clone()),
            Turn::Assistant { content, .. } if !content.trim().is_empty() => Some(content.clone()),
            _ => None,
        })
        .map(InvokeOutput::Text)
        .unwrap_or_else(|| InvokeOutput::NoUsableOutput(no_output_text.to_string()))
}
