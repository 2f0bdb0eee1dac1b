//! Prompt transcript capture for `logging.save_full_prompts`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use spyfall_core::GameResult;

use super::{Agent, AgentFactory, DecisionKind, DecisionRequest};
use crate::config::PlayerConfig;

/// One request/response pair as sent to a player's agent.
#[derive(Debug, Clone, Serialize)]
pub struct PromptExchange {
    pub player: String,
    pub kind: DecisionKind,
    pub system_prompt: String,
    pub user_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Shared, append-only transcript.
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<PromptExchange>>>);

impl Transcript {
    pub fn push(&self, exchange: PromptExchange) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(exchange);
        }
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<PromptExchange> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

/// Wraps another factory and records every exchange its agents make.
pub struct RecordingFactory {
    inner: Arc<dyn AgentFactory>,
    transcript: Transcript,
}

impl RecordingFactory {
    pub fn new(inner: Arc<dyn AgentFactory>) -> Self {
        Self {
            inner,
            transcript: Transcript::default(),
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }
}

impl AgentFactory for RecordingFactory {
    fn create(&self, player: &PlayerConfig) -> GameResult<Box<dyn Agent>> {
        Ok(Box::new(RecordingAgent {
            inner: self.inner.create(player)?,
            player: player.nickname.clone(),
            transcript: self.transcript.clone(),
        }))
    }
}

struct RecordingAgent {
    inner: Box<dyn Agent>,
    player: String,
    transcript: Transcript,
}

#[async_trait]
impl Agent for RecordingAgent {
    async fn decide(&self, request: &DecisionRequest) -> GameResult<Value> {
        let result = self.inner.decide(request).await;
        self.transcript.push(PromptExchange {
            player: self.player.clone(),
            kind: request.kind,
            system_prompt: request.system_prompt.clone(),
            user_prompt: request.user_prompt.clone(),
            response: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(ToString::to_string),
            timestamp: Utc::now(),
        });
        result
    }
}
