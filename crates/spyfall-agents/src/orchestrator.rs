//! Game and round loops: assign roles, drive the protocols, score, repeat.
//!
//! Everything runs on one task and every agent call is awaited before the
//! next is issued. A failed round is closed with `EndingCondition::Error`,
//! scored on whatever history it has, and the game moves on.

use std::sync::Arc;

use spyfall_core::{
    next_asker, score_round, EndingCondition, ErrorRecord, GameError, GamePhase, GameResult,
    GameState, RoleAssigner, RoundPhase, RoundState,
};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::agents::{AgentFactory, AgentPool};
use crate::config::GameConfig;
use crate::prompts::PromptBuilder;
use crate::protocols::{SpyGuessCheck, TurnProtocol, VotingProtocol};

/// Fresh game id: `game_` followed by 8 hex characters.
pub fn new_game_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("game_{}", &id[..8])
}

pub struct Orchestrator {
    config: GameConfig,
    players: Vec<String>,
    assigner: RoleAssigner,
    turns: TurnProtocol,
    voting: VotingProtocol,
    spy_guess: SpyGuessCheck,
}

impl Orchestrator {
    /// Wire the protocols to `factory`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `config` fails validation, so every round can
    /// assign roles.
    pub fn new(
        config: GameConfig,
        factory: Arc<dyn AgentFactory>,
        prompts: PromptBuilder,
    ) -> GameResult<Self> {
        config.validate()?;
        let pool = AgentPool::new(factory, config.players.clone());
        let prompts = Arc::new(prompts);
        Ok(Self {
            players: config.nicknames(),
            assigner: RoleAssigner::new(config.game.seed()),
            turns: TurnProtocol::new(pool.clone(), Arc::clone(&prompts)),
            voting: VotingProtocol::new(pool.clone(), Arc::clone(&prompts)),
            spy_guess: SpyGuessCheck::new(pool, prompts),
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Play `num_rounds` rounds and return the finished game.
    ///
    /// Always ends in `Completed`; round failures are kept in `errors`.
    pub async fn run_game(&mut self) -> GameState {
        self.assigner = RoleAssigner::new(self.config.game.seed());

        let mut game = GameState::new(new_game_id());
        game.transition_to(GamePhase::InProgress);
        game.init_scores(self.players.iter().map(String::as_str));
        info!(
            game_id = %game.game_id,
            players = self.players.len(),
            rounds = self.config.game.num_rounds,
            seed = self.config.game.seed(),
            "Game started"
        );

        for round_number in 1..=self.config.game.num_rounds {
            match self.run_round(round_number).await {
                Ok((round, failure)) => {
                    if let Some(record) = failure {
                        game.record_error(record);
                    }
                    game.record_round(round);
                }
                Err(e) => {
                    error!(round = round_number, error = %e, "Round could not start");
                    game.record_error(ErrorRecord::from_error(&e, round_number));
                    game.current_round = round_number;
                }
            }
        }

        game.transition_to(GamePhase::Completed);
        let (best, leaders) = game.leaders();
        info!(
            game_id = %game.game_id,
            best,
            leaders = %leaders.join(", "),
            errors = game.errors.len(),
            "Game completed"
        );
        game
    }

    /// Play one round to completion.
    ///
    /// Returns the finished round plus an error record when it ended in
    /// error. `Err` only when roles could not be assigned.
    pub async fn run_round(
        &mut self,
        round_number: u32,
    ) -> GameResult<(RoundState, Option<ErrorRecord>)> {
        let (roles, location) = self
            .assigner
            .assign(&self.players, &self.config.locations)?;
        let mut round = RoundState::new(round_number, roles, location)?;
        info!(round = round_number, "Round started");
        debug!(
            round = round_number,
            location = %round.location,
            spy = %round.spy_nickname,
            "Roles assigned"
        );

        let (ending, failure) = match self.play_round(&mut round).await {
            Ok(ending) => (ending, None),
            Err(e) => {
                let mut record = ErrorRecord::from_error(&e, round_number)
                    .with_turn(turn_count(&round) + 1);
                if let Some(asker) = &round.current_asker {
                    record = record.with_player(asker.clone());
                }
                error!(
                    round = round_number,
                    kind = e.kind(),
                    error = %e,
                    "Round aborted"
                );
                (EndingCondition::Error, Some(record))
            }
        };

        round.ending_condition = Some(ending);
        round.transition_to(RoundPhase::Scoring);
        round.round_scores = score_round(&round);
        round.transition_to(RoundPhase::Completed);
        info!(
            round = round_number,
            ending = %ending,
            turns = round.conversation_history.len(),
            scores = ?round.round_scores,
            "Round ended"
        );
        Ok((round, failure))
    }

    async fn play_round(&self, round: &mut RoundState) -> GameResult<EndingCondition> {
        round.transition_to(RoundPhase::Questioning);
        let mut current = self
            .players
            .first()
            .cloned()
            .ok_or_else(|| GameError::InvalidInput("no players configured".into()))?;
        round.current_asker = Some(current.clone());

        for _ in 0..self.config.game.max_turns_per_round {
            if round.is_spy(&current) {
                let guess = self
                    .spy_guess
                    .check(
                        &current,
                        &round.conversation_history,
                        &self.config.locations,
                        &round.location,
                    )
                    .await?;
                if let Some(guess) = guess {
                    round.transition_to(RoundPhase::SpyGuessing);
                    round.spy_guess = Some(guess);
                    return Ok(EndingCondition::SpyGuess);
                }
            }

            let suspect = self
                .voting
                .check_initiation(
                    &current,
                    &round.role_assignments,
                    &round.conversation_history,
                    &round.players_who_voted,
                )
                .await?;
            if let Some(suspect) = suspect {
                round.transition_to(RoundPhase::Voting);
                let attempt = self
                    .voting
                    .conduct_vote(
                        &current,
                        &suspect,
                        &round.role_assignments,
                        &round.conversation_history,
                    )
                    .await;
                let passed = attempt.passed;
                round.record_vote(attempt);
                if passed {
                    return Ok(EndingCondition::Vote);
                }
                round.transition_to(RoundPhase::Questioning);
            }

            let turn = self
                .turns
                .execute_turn(
                    &current,
                    &round.role_assignments,
                    &round.conversation_history,
                    &self.players,
                    round.previous_asker.as_deref(),
                )
                .await?;
            let next = next_asker(&turn.answerer_nickname).to_string();
            round.record_turn(turn);
            round.previous_asker = Some(current);
            round.current_asker = Some(next.clone());
            current = next;
        }

        Ok(EndingCondition::TurnLimitReached)
    }
}

fn turn_count(round: &RoundState) -> u32 {
    u32::try_from(round.conversation_history.len()).unwrap_or(u32::MAX - 1)
}
