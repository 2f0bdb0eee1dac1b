//! Game-level state: phase, completed rounds, cumulative scores, errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::phase::GamePhase;
use crate::round::RoundState;
use crate::types::ErrorRecord;

/// The whole game, owned by the caller until the final log is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub phase: GamePhase,
    pub current_round: u32,
    pub rounds_data: Vec<RoundState>,
    pub player_scores: BTreeMap<String, i32>,
    pub errors: Vec<ErrorRecord>,
}

impl GameState {
    /// Create a game in `Initializing`.
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            phase: GamePhase::Initializing,
            current_round: 0,
            rounds_data: Vec::new(),
            player_scores: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Move to `to` if the game table allows it; `false` leaves the phase unchanged.
    pub fn transition_to(&mut self, to: GamePhase) -> bool {
        if !self.phase.can_transition_to(to) {
            tracing::warn!(
                game_id = %self.game_id,
                from = %self.phase,
                to = %to,
                "Rejected game transition"
            );
            return false;
        }

        tracing::debug!(game_id = %self.game_id, from = %self.phase, to = %to, "Game transition");
        self.phase = to;
        true
    }

    /// Reset every player's cumulative score to zero.
    pub fn init_scores<'a>(&mut self, nicknames: impl IntoIterator<Item = &'a str>) {
        self.player_scores = nicknames
            .into_iter()
            .map(|nickname| (nickname.to_string(), 0))
            .collect();
    }

    /// Add a finished round's deltas to the running totals and keep the record.
    pub fn record_round(&mut self, round: RoundState) {
        for (nickname, delta) in &round.round_scores {
            *self.player_scores.entry(nickname.clone()).or_insert(0) += delta;
        }
        self.current_round = round.round_number;
        self.rounds_data.push(round);
    }

    pub fn record_error(&mut self, error: ErrorRecord) {
        self.errors.push(error);
    }

    /// Highest cumulative score and everyone holding it.
    pub fn leaders(&self) -> (i32, Vec<&str>) {
        let best = self.player_scores.values().copied().max().unwrap_or(0);
        let leaders = self
            .player_scores
            .iter()
            .filter(|(_, score)| **score == best)
            .map(|(nickname, _)| nickname.as_str())
            .collect();
        (best, leaders)
    }
}
