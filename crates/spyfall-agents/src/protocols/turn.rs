//! One question-then-answer exchange.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use spyfall_core::{valid_targets, GameError, GameResult, Role, Turn};
use tracing::info;

use super::role_of;
use crate::agents::{AgentPool, AnswerDecision, DecisionKind, DecisionRequest, QuestionDecision};
use crate::prompts::PromptBuilder;

pub struct TurnProtocol {
    pool: AgentPool,
    prompts: Arc<PromptBuilder>,
}

impl TurnProtocol {
    pub fn new(pool: AgentPool, prompts: Arc<PromptBuilder>) -> Self {
        Self { pool, prompts }
    }

    /// Ask `asker` for a target and question, then ask the target to answer.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when nobody is eligible to be questioned.
    /// - `InvalidAgentResponse` on a malformed payload or an ineligible target.
    /// - `AgentUnavailable` when either agent cannot be reached.
    pub async fn execute_turn(
        &self,
        asker: &str,
        roles: &BTreeMap<String, Role>,
        history: &[Turn],
        all_players: &[String],
        previous_asker: Option<&str>,
    ) -> GameResult<Turn> {
        let targets = valid_targets(asker, previous_asker, all_players);
        if targets.is_empty() {
            return Err(GameError::InvalidInput(format!(
                "{asker} has no one left to question"
            )));
        }

        let task = self.prompts.question_prompt(history, &targets);
        let request = DecisionRequest::for_decision::<QuestionDecision>(
            DecisionKind::Question,
            self.prompts.system_prompt(),
            self.prompts.compose(role_of(roles, asker)?, &task),
        );
        let QuestionDecision {
            target_nickname,
            question,
        } = self.pool.decide(asker, &request).await?;

        if !targets.contains(&target_nickname) {
            return Err(GameError::invalid_response(format!(
                "{asker} chose invalid target '{target_nickname}' (valid: {})",
                targets.join(", ")
            )));
        }

        let task = self.prompts.answer_prompt(history, asker, &question);
        let request = DecisionRequest::for_decision::<AnswerDecision>(
            DecisionKind::Answer,
            self.prompts.system_prompt(),
            self.prompts.compose(role_of(roles, &target_nickname)?, &task),
        );
        let AnswerDecision { answer } = self.pool.decide(&target_nickname, &request).await?;

        let turn_number = u32::try_from(history.len()).unwrap_or(u32::MAX - 1) + 1;
        info!(
            turn = turn_number,
            asker,
            answerer = %target_nickname,
            "Turn completed"
        );
        Ok(Turn {
            turn_number,
            asker_nickname: asker.to_string(),
            answerer_nickname: target_nickname,
            question,
            answer,
            timestamp: Utc::now(),
        })
    }
}
