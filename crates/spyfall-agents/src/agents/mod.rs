//! Agent capability: one structured decision per call.
//!
//! The protocols never talk to a model directly. They ask an `AgentPool` for a
//! fresh handle for the player whose decision is needed, send a
//! `DecisionRequest` (system context + task prompt + JSON schema) and
//! deserialize the reply into one of the types in `decisions`.

pub mod decisions;
pub mod openrouter;
pub mod recording;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use spyfall_core::{GameError, GameResult};

use crate::config::PlayerConfig;

pub use decisions::{
    AnswerDecision, BallotDecision, QuestionDecision, SpyGuessDecision, VoteInitiationDecision,
};

/// Which decision point a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Question,
    Answer,
    VoteInitiation,
    Ballot,
    SpyGuess,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => write!(f, "question"),
            Self::Answer => write!(f, "answer"),
            Self::VoteInitiation => write!(f, "vote_initiation"),
            Self::Ballot => write!(f, "ballot"),
            Self::SpyGuess => write!(f, "spy_guess"),
        }
    }
}

/// A single prompt-to-decision request.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRequest {
    pub kind: DecisionKind,
    pub system_prompt: String,
    pub user_prompt: String,
    /// JSON schema the reply must satisfy.
    pub schema: serde_json::Value,
}

impl DecisionRequest {
    /// Build a request whose schema is derived from `T`.
    pub fn for_decision<T: JsonSchema>(
        kind: DecisionKind,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        let schema = serde_json::to_value(schemars::schema_for!(T))
            .unwrap_or(serde_json::Value::Null);
        Self {
            kind,
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            schema,
        }
    }
}

/// Something that turns a prompt into a structured JSON decision.
///
/// Implementations own transport and retries; they return
/// `AgentUnavailable` when the backend cannot be reached and
/// `InvalidAgentResponse` when the reply is not JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Agent: Send + Sync {
    async fn decide(&self, request: &DecisionRequest) -> GameResult<serde_json::Value>;
}

/// Builds an agent handle for a configured player.
pub trait AgentFactory: Send + Sync {
    fn create(&self, player: &PlayerConfig) -> GameResult<Box<dyn Agent>>;
}

/// Send `request` and deserialize the reply into `T`.
pub async fn request_decision<T>(agent: &dyn Agent, request: &DecisionRequest) -> GameResult<T>
where
    T: JsonSchema + DeserializeOwned,
{
    let value = agent.decide(request).await?;
    serde_json::from_value(value).map_err(|e| {
        GameError::invalid_response(format!("{} payload failed validation: {e}", request.kind))
    })
}

/// Resolves nicknames to fresh agent handles.
///
/// Injected into every protocol; holds the factory and the player table so a
/// handle is created per call site with that player's model and temperature.
#[derive(Clone)]
pub struct AgentPool {
    factory: Arc<dyn AgentFactory>,
    players: Arc<[PlayerConfig]>,
}

impl AgentPool {
    pub fn new(factory: Arc<dyn AgentFactory>, players: Vec<PlayerConfig>) -> Self {
        Self {
            factory,
            players: players.into(),
        }
    }

    /// A new handle for `nickname`; `InvalidInput` if the player is unknown.
    pub fn agent_for(&self, nickname: &str) -> GameResult<Box<dyn Agent>> {
        let player = self
            .players
            .iter()
            .find(|p| p.nickname == nickname)
            .ok_or_else(|| GameError::InvalidInput(format!("unknown player '{nickname}'")))?;
        self.factory.create(player)
    }

    /// Create a handle for `nickname` and ask it for a `T`.
    pub async fn decide<T>(&self, nickname: &str, request: &DecisionRequest) -> GameResult<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let agent = self.agent_for(nickname)?;
        tracing::debug!(player = nickname, kind = %request.kind, "Requesting decision");
        request_decision(agent.as_ref(), request).await
    }
}
