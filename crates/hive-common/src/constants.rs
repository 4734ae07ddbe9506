//! Common constants used across Hive

/// Default number of model rounds one invocation may take
pub const DEFAULT_MAX_ROUNDS: usize = 50;

/// Default sampling temperature for agent invocations
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// Default limit on nested `send_message` calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 8;

/// Default number of agents activated concurrently by `activate_all`
pub const DEFAULT_MAX_PARALLEL_ACTIVATIONS: usize = 8;

/// Text returned when an invocation produced nothing usable
pub const DEFAULT_NO_OUTPUT_TEXT: &str = "Error: no suitable message with text was found.";

/// Name of the engine-owned finish tool
pub const FINISH_TOOL_NAME: &str = "finish";

/// Attachment extensions inlined as images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Keywords that mark an agent name as a manager
pub const DEFAULT_MANAGER_KEYWORDS: &[&str] = &[
    "manager",
    "supervisor",
    "controller",
    "coordinator",
    "director",
    "operator",
    "monitor",
    "overseer",
    "observer",
    "lead",
    "orchestrator",
    "moderator",
    "governor",
    "handler",
    "dispatcher",
    "facilitator",
    "executor",
    "planner",
    "strategist",
    "watcher",
    "conductor",
    "chief",
    "inspector",
    "scheduler",
    "initiator",
];

/// Keywords that mark an agent name as a worker
pub const DEFAULT_WORKER_KEYWORDS: &[&str] = &["worker"];

/// Name prefixes of agents whose tools template a `system_worker`
pub const SYSTEM_WORKER_PREFIXES: &[&str] = &["os", "system"];

/// Name prefixes of agents whose tools template a `web_worker`
pub const WEB_WORKER_PREFIXES: &[&str] = &["web", "internet", "browser"];

/// Default timeout values in seconds
pub mod timeouts {
    pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;
    pub const DEFAULT_LLM_TIMEOUT: u64 = 120;
    pub const DEFAULT_SHELL_TIMEOUT: u64 = 60;
}

/// Provider used when the configuration names none
pub const DEFAULT_PROVIDER: &str = "openai";
