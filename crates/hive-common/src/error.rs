//! Hive Common Error Types
//!
//! Centralized error handling for all Hive components

use std::fmt;

/// Main error type for Hive operations
#[derive(Debug)]
pub enum HiveError {
    /// Generic error with message
    Generic(String),
    /// IO-related errors
    Io(std::io::Error),
    /// Serialization/deserialization errors
    Serde(serde_json::Error),
    /// Configuration errors (including ambiguous agent names)
    Config(String),
    /// Model gateway failures (provider unreachable, malformed response)
    Gateway(String),
    /// Tool execution errors
    Tool(String),
    /// Message routing errors (unknown recipient, unregistered agent)
    Routing(String),
    /// A nested call would re-enter an agent already on the call stack
    CallCycle { chain: Vec<String> },
    /// A nested call would exceed the configured call depth
    CallDepthExceeded { depth: usize, limit: usize },
    /// The invocation was cancelled by its caller
    Cancelled,
}

impl HiveError {
    /// Whether this error is one of the refused-recursion kinds.
    pub fn is_recursion(&self) -> bool {
        matches!(
            self,
            HiveError::CallCycle { .. } | HiveError::CallDepthExceeded { .. }
        )
    }
}

impl fmt::Display for HiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiveError::Generic(msg) => write!(f, "Hive error: {}", msg),
            HiveError::Io(err) => write!(f, "IO error: {}", err),
            HiveError::Serde(err) => write!(f, "Serialization error: {}", err),
            HiveError::Config(msg) => write!(f, "Configuration error: {}", msg),
            HiveError::Gateway(msg) => write!(f, "Model gateway error: {}", msg),
            HiveError::Tool(msg) => write!(f, "Tool error: {}", msg),
            HiveError::Routing(msg) => write!(f, "Routing error: {}", msg),
            HiveError::CallCycle { chain } => {
                write!(f, "Call cycle detected: {}", chain.join(" → "))
            }
            HiveError::CallDepthExceeded { depth, limit } => write!(
                f,
                "Call depth {} exceeds the limit of {} nested agent calls",
                depth, limit
            ),
            HiveError::Cancelled => write!(f, "Invocation cancelled"),
        }
    }
}

impl std::error::Error for HiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HiveError::Io(err) => Some(err),
            HiveError::Serde(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience result type for Hive operations
pub type Result<T> = std::result::Result<T, HiveError>;

// Implement From traits for common error types
impl From<std::io::Error> for HiveError {
    fn from(err: std::io::Error) -> Self {
        HiveError::Io(err)
    }
}

impl From<serde_json::Error> for HiveError {
    fn from(err: serde_json::Error) -> Self {
        HiveError::Serde(err)
    }
}

impl From<toml::de::Error> for HiveError {
    fn from(err: toml::de::Error) -> Self {
        HiveError::Config(err.to_string())
    }
}

impl From<anyhow::Error> for HiveError {
    fn from(err: anyhow::Error) -> Self {
        HiveError::Generic(err.to_string())
    }
}
