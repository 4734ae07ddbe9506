//! Conversation turns exchanged between an agent and its model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One piece of a human turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentPart {
    Text(String),
    /// Inlined image, base64-encoded
    Image {
        mime_type: String,
        data_base64: String,
        source: String,
    },
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call ID used to match the result back to this request
    pub call_id: String,

    /// Name of the tool to call
    pub tool_name: String,

    /// Arguments for the tool call as JSON
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(call_id: impl Into<String>, tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// The model's reply for one round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantTurn {
    /// A plain text reply with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting the given tool calls
    pub fn with_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A single entry of an agent's conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Turn {
    Human {
        parts: Vec<ContentPart>,
        at: DateTime<Utc>,
    },
    Assistant {
        content: String,
        tool_calls: Vec<ToolCallRequest>,
        at: DateTime<Utc>,
    },
    ToolResult {
        call_id: String,
        tool_name: String,
        content: String,
        at: DateTime<Utc>,
    },
}

impl Turn {
    pub fn human(parts: Vec<ContentPart>) -> Self {
        Turn::Human {
            parts,
            at: Utc::now(),
        }
    }

    pub fn human_text(text: impl Into<String>) -> Self {
        Self::human(vec![ContentPart::Text(text.into())])
    }

    pub fn assistant(reply: AssistantTurn) -> Self {
        Turn::Assistant {
            content: reply.content,
            tool_calls: reply.tool_calls,
            at: Utc::now(),
        }
    }

    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Turn::ToolResult {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
            at: Utc::now(),
        }
    }

    /// Role tag as shown in logs
    pub fn role(&self) -> &'static str {
        match self {
            Turn::Human { .. } => "human",
            Turn::Assistant { .. } => "assistant",
            Turn::ToolResult { .. } => "tool",
        }
    }

    /// Text of the turn, images rendered as their source path
    pub fn text(&self) -> String {
        match self {
            Turn::Human { parts, .. } => parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text(text) => text.clone(),
                    ContentPart::Image { source, .. } => format!("[image: {}]", source),
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Turn::Assistant { content, .. } => content.clone(),
            Turn::ToolResult { content, .. } => content.clone(),
        }
    }
}
