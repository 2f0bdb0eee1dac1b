//! Agent-driven Spyfall arena.
//!
//! Wires the deterministic rules in `spyfall-core` to language-model agents:
//! YAML configuration, prompt rendering, the turn/voting/spy-guess protocols,
//! the game orchestrator, the execution log and the final JSON game log.

pub mod agents;
pub mod config;
pub mod credentials;
pub mod game_log;
pub mod logging;
pub mod orchestrator;
pub mod prompts;
pub mod protocols;

pub use agents::{Agent, AgentFactory, AgentPool};
pub use config::GameConfig;
pub use orchestrator::Orchestrator;
pub use prompts::PromptBuilder;
