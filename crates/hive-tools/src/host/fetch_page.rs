use anyhow::{Error, anyhow};
use async_trait::async_trait;
use hive_common::timeouts::DEFAULT_HTTP_TIMEOUT;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::base::{AiTool, required_str};
use crate::context::CallContext;

/// Pages longer than this are cut before they reach the conversation
const MAX_PAGE_CHARS: usize = 20_000;

/// Fetches a web page and renders it as HTML or Markdown.
pub struct FetchPageTool {
    client: reqwest::Client,
}

impl FetchPageTool {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT))
            .user_agent("Mozilla/5.0 (compatible; hive-agent/0.1)")
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self { client })
    }

    /// Normalize the URL, prepending https:// when no scheme is given
    fn normalize_url(raw: &str) -> Result<String, Error> {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Ok(trimmed.to_string());
        }
        if trimmed.contains("://") || trimmed.starts_with("javascript:") || trimmed.is_empty() {
            return Err(anyhow!("Unsupported URL '{}': only http and https are allowed", raw));
        }
        debug!("Prepending 'https://' to {}", trimmed);
        Ok(format!("https://{}", trimmed))
    }

    fn truncate(mut content: String) -> String {
        if content.chars().count() > MAX_PAGE_CHARS {
            content = content.chars().take(MAX_PAGE_CHARS).collect();
            content.push_str("\n[... page truncated]");
        }
        content
    }
}

#[async_trait]
impl AiTool for FetchPageTool {
    fn name(&self) -> &str {
        "fetch_page"
    }

    fn description(&self) -> &str {
        r#"Fetches a web page.
Parameters:
- `url`: The URL of the page to fetch.
- `render`: Which format to render the content in. Options are "html" or "md" (default is "md").

Note: If the URL has no scheme, https:// is prepended automatically.
"#
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL of the page to fetch"
                },
                "render": {
                    "type": "string",
                    "description": "Format to render the content: 'html' or 'md' (default: 'md')"
                }
            },
            "required": ["url"]
        })
    }

    fn validate_params(&self, params: &Value) -> Result<(), Error> {
        if !params.is_object() {
            return Err(anyhow!("Parameters must be an object"));
        }
        Self::normalize_url(required_str(params, "url")?)?;
        match params.get("render") {
            None => Ok(()),
            Some(Value::String(r)) if r == "html" || r == "md" => Ok(()),
            Some(_) => Err(anyhow!("Invalid 'render' parameter, must be 'html' or 'md'")),
        }
    }

    async fn execute(&self, params: Value, _ctx: &CallContext) -> Result<Value, Error> {
        self.validate_params(&params)?;

        let url = Self::normalize_url(required_str(&params, "url")?)?;
        let render = params
            .get("render")
            .and_then(|v| v.as_str())
            .unwrap_or("md");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {}", e))?;

        debug!("Response status for {}: {}", url, resp.status());
        if !resp.status().is_success() {
            return Err(anyhow!("{} answered with status {}", url, resp.status()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| anyhow!("Body error: {}", e))?;

        let content = match render {
            "html" => body,
            _ => html2md::rewrite_html(&body, false),
        };

        Ok(json!({ "url": url, "content": Self::truncate(content) }))
    }
}
