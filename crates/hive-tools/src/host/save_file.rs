use anyhow::{Error, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Component, Path, PathBuf};
use tracing::info;

use crate::base::{AiTool, required_str};
use crate::context::CallContext;

/// Saves source code to a file inside the working directory.
pub struct SaveCodeTool {
    working_dir: PathBuf,
}

impl SaveCodeTool {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Resolve `filename` under the working directory, refusing escapes
    fn resolve(&self, filename: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(filename);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if filename.trim().is_empty() || escapes {
            return Err(anyhow!(
                "Invalid filename '{}': must be a relative path inside the working directory",
                filename
            ));
        }
        Ok(self.working_dir.join(relative))
    }
}

#[async_trait]
impl AiTool for SaveCodeTool {
    fn name(&self) -> &str {
        "save_python_code"
    }

    fn description(&self) -> &str {
        r#"Creates or overwrites a script file in the working directory.
Parameters:
- `filename`: Relative path of the file, e.g. `scripts/report.py`.
- `code`: Full file contents.
"#
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Relative path of the file to write"
                },
                "code": {
                    "type": "string",
                    "description": "Full contents of the file"
                }
            },
            "required": ["filename", "code"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &CallContext) -> Result<Value, Error> {
        let filename = required_str(&params, "filename")?;
        let code = required_str(&params, "code")?;
        let path = self.resolve(filename)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, code).await?;
        info!("Saved {} bytes to {:?}", code.len(), path);

        Ok(json!(format!("Saved to {}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_saves_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveCodeTool::new(dir.path());

        let out = tool
            .execute(
                json!({"filename": "scripts/hello.py", "code": "print('hi')\n"}),
                &CallContext::root(1),
            )
            .await
            .unwrap();
        assert!(out.as_str().unwrap().starts_with("Saved to"));

        let saved = std::fs::read_to_string(dir.path().join("scripts/hello.py")).unwrap();
        assert_eq!(saved, "print('hi')\n");
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveCodeTool::new(dir.path());

        for filename in ["../evil.py", "/etc/passwd", ""] {
            let result = tool
                .execute(json!({"filename": filename, "code": "x"}), &CallContext::root(1))
                .await;
            assert!(result.is_err(), "expected rejection for {:?}", filename);
        }
    }
}
