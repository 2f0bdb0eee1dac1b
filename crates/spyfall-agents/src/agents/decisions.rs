//! Structured decision payloads returned by agents.
//!
//! Each type doubles as the JSON schema sent with the request (via
//! `schemars`) and as the validator for the response (via `serde`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Asker picks a target and a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionDecision {
    /// Nickname of the player being questioned.
    pub target_nickname: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnswerDecision {
    pub answer: String,
}

/// Whether the current player accuses someone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VoteInitiationDecision {
    pub initiate_vote: bool,
    #[serde(default)]
    pub suspect_nickname: Option<String>,
}

impl VoteInitiationDecision {
    /// The accused player, when an accusation is actually made.
    pub fn suspect(self) -> Option<String> {
        if !self.initiate_vote {
            return None;
        }
        self.suspect_nickname.filter(|s| !s.trim().is_empty())
    }
}

/// A single yes/no ballot on an accusation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BallotDecision {
    pub vote_yes: bool,
}

/// The spy's choice to name the location now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpyGuessDecision {
    pub make_guess: bool,
    #[serde(default)]
    pub location_guess: Option<String>,
}

impl SpyGuessDecision {
    pub fn guess(self) -> Option<String> {
        if !self.make_guess {
            return None;
        }
        self.location_guess.filter(|s| !s.trim().is_empty())
    }
}
