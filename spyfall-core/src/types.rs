//! Records produced during a round: roles, turns, votes, guesses, errors.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A player's secret for one round.
///
/// `location` is `None` for the spy and the round's location for everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub is_spy: bool,
    pub location: Option<String>,
}

impl Role {
    pub fn spy() -> Self {
        Self {
            is_spy: true,
            location: None,
        }
    }

    pub fn civilian(location: impl Into<String>) -> Self {
        Self {
            is_spy: false,
            location: Some(location.into()),
        }
    }
}

/// One question-then-answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based, increasing within a round.
    pub turn_number: u32,
    pub asker_nickname: String,
    pub answerer_nickname: String,
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

/// A proposal to accuse `suspect`, resolved by unanimous ballot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteAttempt {
    pub initiator: String,
    pub suspect: String,
    /// Every current player → yes/no.
    pub votes: BTreeMap<String, bool>,
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
}

impl VoteAttempt {
    /// Build an attempt; `passed` is true iff every ballot is yes.
    pub fn new(
        initiator: impl Into<String>,
        suspect: impl Into<String>,
        votes: BTreeMap<String, bool>,
    ) -> Self {
        let passed = votes.values().all(|yes| *yes);
        Self {
            initiator: initiator.into(),
            suspect: suspect.into(),
            votes,
            passed,
            timestamp: Utc::now(),
        }
    }

    pub fn yes_count(&self) -> usize {
        self.votes.values().filter(|yes| **yes).count()
    }
}

/// The spy's attempt to name the location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpyGuess {
    pub spy_nickname: String,
    pub guessed_location: String,
    pub actual_location: String,
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl SpyGuess {
    pub fn new(
        spy_nickname: impl Into<String>,
        guessed_location: impl Into<String>,
        actual_location: impl Into<String>,
    ) -> Self {
        let guessed_location = guessed_location.into();
        let actual_location = actual_location.into();
        Self {
            spy_nickname: spy_nickname.into(),
            correct: guessed_location == actual_location,
            guessed_location,
            actual_location,
            timestamp: Utc::now(),
        }
    }
}

/// Why a round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndingCondition {
    SpyGuess,
    Vote,
    TurnLimitReached,
    Error,
}

impl fmt::Display for EndingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpyGuess => write!(f, "spy_guess"),
            Self::Vote => write!(f, "vote"),
            Self::TurnLimitReached => write!(f, "turn_limit_reached"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A round-scoped failure kept on the game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error_type: String,
    pub message: String,
    pub round_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_number: Option<u32>,
    pub timestamp: DateTime<Utc>,
    pub recovered: bool,
}

impl ErrorRecord {
    pub fn from_error(error: &GameError, round_number: u32) -> Self {
        Self {
            error_type: error.kind().to_string(),
            message: error.to_string(),
            round_number,
            player_nickname: None,
            turn_number: None,
            timestamp: Utc::now(),
            recovered: error.is_round_recoverable(),
        }
    }

    pub fn with_player(mut self, nickname: impl Into<String>) -> Self {
        self.player_nickname = Some(nickname.into());
        self
    }

    pub fn with_turn(mut self, turn_number: u32) -> Self {
        self.turn_number = Some(turn_number);
        self
    }
}
