//! Game and round phases with their legal transition tables.
//!
//! Both machines share one contract: an illegal transition is rejected by
//! returning `false` and leaving the phase untouched. Nothing here panics or
//! returns an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game-level phase.
///
/// Every game starts at `Initializing` and terminates at either `Completed`
/// or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Initializing,
    InProgress,
    Completed,
    Error,
}

impl GamePhase {
    pub const ALL: [GamePhase; 4] = [
        Self::Initializing,
        Self::InProgress,
        Self::Completed,
        Self::Error,
    ];

    /// Whether this is a terminal phase (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Legal game transitions:
    /// ```text
    /// Initializing → InProgress | Error
    /// InProgress   → Completed | Error
    /// ```
    pub fn can_transition_to(self, to: GamePhase) -> bool {
        use GamePhase::*;

        matches!(
            (self, to),
            (Initializing, InProgress)
                | (Initializing, Error)
                | (InProgress, Completed)
                | (InProgress, Error)
        )
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Round-level phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Spy and location are being chosen.
    RoleAssignment,
    /// Players take question/answer turns.
    Questioning,
    /// Ballots are being collected for an accusation.
    Voting,
    /// The spy has committed to naming the location.
    SpyGuessing,
    /// Points are being computed.
    Scoring,
    /// Round finished; terminal.
    Completed,
}

impl RoundPhase {
    pub const ALL: [RoundPhase; 6] = [
        Self::RoleAssignment,
        Self::Questioning,
        Self::Voting,
        Self::SpyGuessing,
        Self::Scoring,
        Self::Completed,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Legal round transitions:
    /// ```text
    /// RoleAssignment → Questioning
    /// Questioning    → Voting | SpyGuessing | Scoring
    /// Voting         → Questioning | Scoring
    /// SpyGuessing    → Scoring
    /// Scoring        → Completed
    /// ```
    pub fn can_transition_to(self, to: RoundPhase) -> bool {
        use RoundPhase::*;

        matches!(
            (self, to),
            (RoleAssignment, Questioning)
                | (Questioning, Voting)
                | (Questioning, SpyGuessing)
                | (Questioning, Scoring)
                // A failed vote resumes questioning
                | (Voting, Questioning)
                | (Voting, Scoring)
                | (SpyGuessing, Scoring)
                | (Scoring, Completed)
        )
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleAssignment => write!(f, "role_assignment"),
            Self::Questioning => write!(f, "questioning"),
            Self::Voting => write!(f, "voting"),
            Self::SpyGuessing => write!(f, "spy_guessing"),
            Self::Scoring => write!(f, "scoring"),
            Self::Completed => write!(f, "completed"),
        }
    }
}
