//! Hive Tools - Tool trait, tool sets and host tools
//!
//! This crate provides the `AiTool` trait every capability implements, the
//! `CallContext` threaded through nested agent calls, the snapshot `ToolSet`
//! an agent owns, the engine-owned `finish` tool, and the host tools the CLI
//! hands to its default workers.

pub mod base;
pub mod context;
pub mod finish;
pub mod host;
pub mod toolset;

// Re-export key tools for convenience
pub use base::{AiTool, render_tool_output};
pub use context::CallContext;
pub use finish::FinishTool;
pub use host::{FetchPageTool, SaveCodeTool, ShellTool};
pub use toolset::ToolSet;
