//! Per-round state and its phase machine.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::phase::RoundPhase;
use crate::types::{EndingCondition, Role, SpyGuess, Turn, VoteAttempt};

/// Everything that happened in one round.
///
/// Created in `RoleAssignment` by the orchestrator and kept as an immutable
/// record once `Completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub round_number: u32,
    pub phase: RoundPhase,
    pub location: String,
    pub spy_nickname: String,
    pub role_assignments: BTreeMap<String, Role>,
    pub conversation_history: Vec<Turn>,
    pub votes: Vec<VoteAttempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spy_guess: Option<SpyGuess>,
    pub ending_condition: Option<EndingCondition>,
    pub round_scores: BTreeMap<String, i32>,
    pub current_asker: Option<String>,
    pub previous_asker: Option<String>,
    pub players_who_voted: BTreeSet<String>,
}

impl RoundState {
    /// Start a round from a role assignment.
    ///
    /// Fails with `InvalidInput` unless the assignment holds exactly one spy.
    pub fn new(
        round_number: u32,
        role_assignments: BTreeMap<String, Role>,
        location: impl Into<String>,
    ) -> GameResult<Self> {
        let mut spies = role_assignments
            .iter()
            .filter(|(_, role)| role.is_spy)
            .map(|(nickname, _)| nickname.clone());
        let spy_nickname = spies
            .next()
            .ok_or_else(|| GameError::InvalidInput("role assignment has no spy".into()))?;
        if spies.next().is_some() {
            return Err(GameError::InvalidInput(
                "role assignment has more than one spy".into(),
            ));
        }

        Ok(Self {
            round_number,
            phase: RoundPhase::RoleAssignment,
            location: location.into(),
            spy_nickname,
            role_assignments,
            conversation_history: Vec::new(),
            votes: Vec::new(),
            spy_guess: None,
            ending_condition: None,
            round_scores: BTreeMap::new(),
            current_asker: None,
            previous_asker: None,
            players_who_voted: BTreeSet::new(),
        })
    }

    /// Move to `to` if the round table allows it.
    ///
    /// Returns `false` and leaves the phase unchanged otherwise.
    pub fn transition_to(&mut self, to: RoundPhase) -> bool {
        if !self.phase.can_transition_to(to) {
            tracing::warn!(
                round = self.round_number,
                from = %self.phase,
                to = %to,
                "Rejected round transition"
            );
            return false;
        }

        tracing::debug!(
            round = self.round_number,
            from = %self.phase,
            to = %to,
            "Round transition"
        );
        self.phase = to;
        true
    }

    pub fn is_spy(&self, nickname: &str) -> bool {
        self.spy_nickname == nickname
    }

    /// Non-spy players in nickname order.
    pub fn civilians(&self) -> impl Iterator<Item = &str> {
        self.role_assignments
            .keys()
            .map(String::as_str)
            .filter(move |nickname| *nickname != self.spy_nickname)
    }

    /// The earliest vote that passed, if any.
    pub fn first_passed_vote(&self) -> Option<&VoteAttempt> {
        self.votes.iter().find(|vote| vote.passed)
    }

    pub fn record_turn(&mut self, turn: Turn) {
        self.conversation_history.push(turn);
    }

    /// Append a vote and mark its initiator as having used their accusation.
    pub fn record_vote(&mut self, vote: VoteAttempt) {
        self.players_who_voted.insert(vote.initiator.clone());
        self.votes.push(vote);
    }
}
