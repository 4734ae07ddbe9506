//! Model gateway backed by the `genai` client

use async_trait::async_trait;
use genai::Client as GenaiClient;
use genai::chat::{
    ChatMessage as GenaiChatMessage, ChatOptions, ChatRequest, ContentPart as GenaiContentPart,
    MessageContent, Tool, ToolCall, ToolResponse,
};
use hive_common::{HiveError, ProviderConfig, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::conversation::{AssistantTurn, ContentPart, ToolCallRequest, Turn};
use crate::gateway::{ModelGateway, ToolSchema};

/// Gateway that sends conversations to a provider through `genai`
///
/// Provider credentials are read by `genai` from the environment
/// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, ...).
pub struct GenaiGateway {
    client: GenaiClient,
    model: String,
    timeout: Option<Duration>,
}

impl GenaiGateway {
    /// Create a gateway for the given model
    pub fn new(model: impl Into<String>) -> Self {
        let client = GenaiClient::builder()
            .with_chat_options(ChatOptions {
                capture_content: Some(true),
                capture_tool_calls: Some(true),
                capture_usage: Some(true),
                ..Default::default()
            })
            .build();

        GenaiGateway {
            client,
            model: model.into(),
            timeout: None,
        }
    }

    /// Create a gateway from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Self {
        let mut gateway = Self::new(config.default_model.clone());
        gateway.timeout = config.timeout_seconds.map(Duration::from_secs);
        gateway
    }

    /// Map one turn onto the genai messages replaying it
    ///
    /// An assistant turn with both text and tool calls becomes two messages,
    /// since a genai message carries a single kind of content.
    fn to_genai_messages(turn: &Turn) -> Vec<GenaiChatMessage> {
        match turn {
            Turn::Human { parts, .. } => {
                let has_image = parts
                    .iter()
                    .any(|part| matches!(part, ContentPart::Image { .. }));
                if !has_image {
                    let text = parts
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::Text(text) => Some(text.as_str()),
                            ContentPart::Image { .. } => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    return vec![GenaiChatMessage::user(text)];
                }

                let parts = parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text(text) => GenaiContentPart::from_text(text.clone()),
                        ContentPart::Image {
                            mime_type,
                            data_base64,
                            ..
                        } => GenaiContentPart::from_image_base64(
                            mime_type.clone(),
                            data_base64.as_str(),
                        ),
                    })
                    .collect::<Vec<_>>();
                vec![GenaiChatMessage::user(MessageContent::from_parts(parts))]
            }
            Turn::Assistant {
                content,
                tool_calls,
                ..
            } => {
                if tool_calls.is_empty() {
                    return vec![GenaiChatMessage::assistant(content.clone())];
                }

                let mut messages = Vec::with_capacity(2);
                if !content.trim().is_empty() {
                    messages.push(GenaiChatMessage::assistant(content.clone()));
                }
                let calls = tool_calls
                    .iter()
                    .map(|call| ToolCall {
                        call_id: call.call_id.clone(),
                        fn_name: call.tool_name.clone(),
                        fn_arguments: call.arguments.clone(),
                    })
                    .collect::<Vec<_>>();
                messages.push(GenaiChatMessage::from(calls));
                messages
            }
            Turn::ToolResult {
                call_id, content, ..
            } => vec![GenaiChatMessage::from(ToolResponse::new(
                call_id.clone(),
                content.clone(),
            ))],
        }
    }

    fn to_genai_tool(schema: &ToolSchema) -> Tool {
        Tool::new(schema.name.clone())
            .with_description(schema.description.clone())
            .with_schema(schema.parameters.clone())
    }

    fn collect_reply(contents: Vec<MessageContent>) -> AssistantTurn {
        let mut reply = AssistantTurn::default();
        let mut texts = Vec::new();

        for content in contents {
            match content {
                MessageContent::Text(text) => texts.push(text),
                MessageContent::ToolCalls(calls) => {
                    for call in calls {
                        reply.tool_calls.push(ToolCallRequest {
                            call_id: call.call_id,
                            tool_name: call.fn_name,
                            arguments: normalize_arguments(call.fn_arguments),
                        });
                    }
                }
                MessageContent::Parts(parts) => {
                    for part in parts {
                        if let GenaiContentPart::Text(text) = part {
                            texts.push(text);
                        }
                    }
                }
                _ => {}
            }
        }

        reply.content = texts.join(" ");
        reply
    }
}

/// Some providers send arguments as a JSON-encoded string
fn normalize_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

#[async_trait]
impl ModelGateway for GenaiGateway {
    async fn send(
        &self,
        conversation: &[Turn],
        temperature: f64,
        tools: &[ToolSchema],
    ) -> Result<AssistantTurn> {
        debug!("Sending {} turns to {}", conversation.len(), self.model);

        let messages: Vec<GenaiChatMessage> = conversation
            .iter()
            .flat_map(Self::to_genai_messages)
            .collect();
        let mut chat_req = ChatRequest::new(messages);

        if !tools.is_empty() {
            chat_req = chat_req.with_tools(tools.iter().map(Self::to_genai_tool).collect::<Vec<_>>());
        }

        let options = ChatOptions::default().with_temperature(temperature);
        let exec = self.client.exec_chat(&self.model, chat_req, Some(&options));

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exec).await.map_err(|_| {
                HiveError::Gateway(format!("{} did not answer within {:?}", self.model, limit))
            })?,
            None => exec.await,
        }
        .map_err(|e| HiveError::Gateway(format!("GenAI API error: {}", e)))?;

        let reply = Self::collect_reply(response.content);
        info!(
            "{} replied with {} chars and {} tool calls",
            self.model,
            reply.content.len(),
            reply.tool_calls.len()
        );
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai::chat::{ChatRole, ImageSource};
    use serde_json::json;

    #[test]
    fn test_string_arguments_are_decoded() {
        let args = normalize_arguments(Value::String(r#"{"to":"os_worker"}"#.into()));
        assert_eq!(args, json!({"to": "os_worker"}));

        let garbage = normalize_arguments(Value::String("not json".into()));
        assert_eq!(garbage, Value::String("not json".into()));

        assert_eq!(normalize_arguments(Value::Null), json!({}));
    }

    #[test]
    fn test_images_travel_as_base64_parts() {
        let turn = Turn::human(vec![
            ContentPart::Text("describe".into()),
            ContentPart::Image {
                mime_type: "image/png".into(),
                data_base64: "iVBORw0KGgo=".into(),
                source: "shot.png".into(),
            },
        ]);

        let messages = GenaiGateway::to_genai_messages(&turn);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].role, ChatRole::User));
        let MessageContent::Parts(parts) = &messages[0].content else {
            panic!("expected parts, got {:?}", messages[0].content);
        };
        assert!(matches!(&parts[0], GenaiContentPart::Text(text) if text == "describe"));
        match &parts[1] {
            GenaiContentPart::Image {
                content_type,
                source: ImageSource::Base64(data),
            } => {
                assert_eq!(content_type, "image/png");
                assert_eq!(&**data, "iVBORw0KGgo=");
            }
            other => panic!("expected base64 image, got {:?}", other),
        }

        let plain = GenaiGateway::to_genai_messages(&Turn::human_text("hello"));
        assert_eq!(plain[0].content.text(), Some("hello"));
    }

    #[test]
    fn test_tool_calls_and_results_are_structured() {
        let turn = Turn::assistant(AssistantTurn {
            content: "Checking the disk".into(),
            tool_calls: vec![ToolCallRequest::new(
                "call_1",
                "run_shell_command",
                json!({"command": "df -h"}),
            )],
        });

        let messages = GenaiGateway::to_genai_messages(&turn);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content.text(), Some("Checking the disk"));
        assert!(matches!(messages[1].role, ChatRole::Assistant));
        let calls = messages[1].content.tool_calls().unwrap();
        assert_eq!(calls[0].call_id, "call_1");
        assert_eq!(calls[0].fn_name, "run_shell_command");
        assert_eq!(calls[0].fn_arguments, json!({"command": "df -h"}));

        let calls_only = GenaiGateway::to_genai_messages(&Turn::assistant(
            AssistantTurn::with_calls(vec![ToolCallRequest::new("call_2", "finish", json!({}))]),
        ));
        assert_eq!(calls_only.len(), 1);

        let result = GenaiGateway::to_genai_messages(&Turn::tool_result(
            "call_1",
            "run_shell_command",
            "exit 0",
        ));
        assert!(matches!(result[0].role, ChatRole::Tool));
        let MessageContent::ToolResponses(responses) = &result[0].content else {
            panic!("expected tool responses, got {:?}", result[0].content);
        };
        assert_eq!(responses[0].call_id, "call_1");
        assert_eq!(responses[0].content, "exit 0");
    }

    #[test]
    fn test_gateway_from_config() {
        let config = ProviderConfig {
            default_model: "gpt-4o-mini".into(),
            timeout_seconds: Some(5),
            ..Default::default()
        };
        let gateway = GenaiGateway::from_config(&config);
        assert_eq!(gateway.model_name(), "gpt-4o-mini");
        assert_eq!(gateway.timeout, Some(Duration::from_secs(5)));
    }
}
