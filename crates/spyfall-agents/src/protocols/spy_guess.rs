//! The spy's chance to name the location on their own turn.

use std::sync::Arc;

use spyfall_core::{GameResult, Role, SpyGuess, Turn};
use tracing::info;

use crate::agents::{AgentPool, DecisionKind, DecisionRequest, SpyGuessDecision};
use crate::prompts::PromptBuilder;

pub struct SpyGuessCheck {
    pool: AgentPool,
    prompts: Arc<PromptBuilder>,
}

impl SpyGuessCheck {
    pub fn new(pool: AgentPool, prompts: Arc<PromptBuilder>) -> Self {
        Self { pool, prompts }
    }

    /// Offer the spy a guess. `None` means the spy keeps playing.
    pub async fn check(
        &self,
        spy: &str,
        history: &[Turn],
        available_locations: &[String],
        actual_location: &str,
    ) -> GameResult<Option<SpyGuess>> {
        let task = self.prompts.spy_guess_prompt(history, available_locations);
        let request = DecisionRequest::for_decision::<SpyGuessDecision>(
            DecisionKind::SpyGuess,
            self.prompts.system_prompt(),
            self.prompts.compose(&Role::spy(), &task),
        );
        let decision: SpyGuessDecision = self.pool.decide(spy, &request).await?;

        let Some(guessed) = decision.guess() else {
            return Ok(None);
        };
        let guess = SpyGuess::new(spy, guessed, actual_location);
        info!(
            spy,
            guess = %guess.guessed_location,
            correct = guess.correct,
            "Spy guessed the location"
        );
        Ok(Some(guess))
    }
}
