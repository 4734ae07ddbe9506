//! Call chain carried through nested agent invocations

use hive_common::{HiveError, Result};
use tokio_util::sync::CancellationToken;

/// The agents currently on the call stack of one top-level invocation
///
/// Every nested `send_message` enters the target agent into a child context.
/// Entering an agent already on the chain, or going deeper than `max_depth`,
/// is refused.
#[derive(Debug, Clone)]
pub struct CallContext {
    chain: Vec<String>,
    max_depth: usize,
    cancel: CancellationToken,
}

impl CallContext {
    /// Context for a top-level invocation
    pub fn root(max_depth: usize) -> Self {
        Self::with_cancellation(max_depth, CancellationToken::new())
    }

    /// Top-level context cancelled through `cancel`
    pub fn with_cancellation(max_depth: usize, cancel: CancellationToken) -> Self {
        Self {
            chain: Vec::new(),
            max_depth: max_depth.max(1),
            cancel,
        }
    }

    /// Child context with `agent` pushed on the chain
    pub fn enter(&self, agent: &str) -> Result<CallContext> {
        if self.chain.iter().any(|name| name == agent) {
            let mut chain = self.chain.clone();
            chain.push(agent.to_string());
            return Err(HiveError::CallCycle { chain });
        }

        let depth = self.chain.len() + 1;
        if depth > self.max_depth {
            return Err(HiveError::CallDepthExceeded {
                depth,
                limit: self.max_depth,
            });
        }

        let mut chain = self.chain.clone();
        chain.push(agent.to_string());
        Ok(CallContext {
            chain,
            max_depth: self.max_depth,
            cancel: self.cancel.clone(),
        })
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The agent whose loop is running
    pub fn current_agent(&self) -> Option<&str> {
        self.chain.last().map(|s| s.as_str())
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
