//! Game error taxonomy with recovery classification.
//!
//! | Variant                | Raised by                         | Scope            |
//! |------------------------|-----------------------------------|------------------|
//! | `InvalidInput`         | config, role assignment, rotation | startup or round |
//! | `InvalidAgentResponse` | any structured agent decision     | round            |
//! | `AgentUnavailable`     | agent transport                   | round            |
//!
//! Round-scoped errors end the current round with `EndingCondition::Error`;
//! they never abort the game loop.

use thiserror::Error;

/// Unified error type for rules and protocol operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Empty player or location list, unknown player, configuration failure.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Agent payload failed schema validation or named an illegal choice.
    #[error("Invalid agent response: {0}")]
    InvalidAgentResponse(String),

    /// The agent could not be reached (network, HTTP status, timeout).
    #[error("Agent unavailable: {0}")]
    AgentUnavailable(String),
}

/// Result alias for game operations.
pub type GameResult<T> = Result<T, GameError>;

impl GameError {
    /// Stable snake_case label used in error records and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidAgentResponse(_) => "invalid_agent_response",
            Self::AgentUnavailable(_) => "agent_unavailable",
        }
    }

    /// Whether the orchestrator may recover by ending the current round.
    ///
    /// Every variant is recoverable at round scope; only configuration
    /// loading treats `InvalidInput` as fatal, and that happens before a
    /// game exists.
    pub fn is_round_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::InvalidAgentResponse(_) | Self::AgentUnavailable(_)
        )
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidAgentResponse(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::AgentUnavailable(message.into())
    }
}
