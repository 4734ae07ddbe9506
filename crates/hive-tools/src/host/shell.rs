use anyhow::{Error, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::base::{AiTool, required_str};
use crate::context::CallContext;

/// Runs a command through the platform shell inside the working directory.
pub struct ShellTool {
    working_dir: PathBuf,
    timeout: Duration,
}

impl ShellTool {
    pub fn new(working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout,
        }
    }

    fn command(line: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(line);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(line);
            cmd
        };
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl AiTool for ShellTool {
    fn name(&self) -> &str {
        "run_shell_command"
    }

    fn description(&self) -> &str {
        r#"Runs a shell command in the agent working directory.
Parameters:
- `command`: The command line to execute.

Returns the exit code, stdout and stderr. Long-running commands are killed after the configured timeout.
"#
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command line to execute"
                }
            },
            "required": ["command"]
        })
    }

    fn validate_params(&self, params: &Value) -> Result<(), Error> {
        let command = required_str(params, "command")?;
        if command.trim().is_empty() {
            return Err(anyhow!("'command' must not be empty"));
        }
        Ok(())
    }

    async fn execute(&self, params: Value, _ctx: &CallContext) -> Result<Value, Error> {
        self.validate_params(&params)?;
        let line = required_str(&params, "command")?;

        tokio::fs::create_dir_all(&self.working_dir).await?;
        info!("Running shell command in {:?}: {}", self.working_dir, line);

        let mut cmd = Self::command(line);
        cmd.current_dir(&self.working_dir);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| anyhow!("Command timed out after {:?}", self.timeout))?
            .map_err(|e| anyhow!("Failed to spawn command: {}", e))?;

        debug!("Command exited with {:?}", output.status.code());

        Ok(json!({
            "exit_code": output.status.code(),
            "stdout": String::from_utf8_lossy(&output.stdout),
            "stderr": String::from_utf8_lossy(&output.stderr),
        }))
    }
}
