//! Agent module for supervised multiagent systems
//!
//! An [`Agent`] owns one conversation and one tool set and runs the bounded
//! tool-calling loop. The [`AgentRegistry`] supervises a population of agents
//! and wires a [`Communicator`] for each of them.

pub mod agent;
mod attachments;
pub mod communication;
pub mod engine;
pub mod one_shot;
pub mod prompt;
pub mod registry;
pub mod role;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{Agent, AgentBuilder};
pub use communication::{Communicator, Envelope, NO_KNOWN_AGENTS};
pub use engine::{InvokeOutput, InvokeRequest};
pub use one_shot::run_once_agent;
pub use prompt::compose_prompt;
pub use registry::{ActivationReport, AgentRegistry, WeakRegistry};
pub use role::RoleClassifier;
