//! Accusations and unanimous ballots.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use spyfall_core::{GameResult, Role, Turn, VoteAttempt};
use tracing::{info, warn};

use super::role_of;
use crate::agents::{
    AgentPool, BallotDecision, DecisionKind, DecisionRequest, VoteInitiationDecision,
};
use crate::prompts::PromptBuilder;

pub struct VotingProtocol {
    pool: AgentPool,
    prompts: Arc<PromptBuilder>,
}

impl VotingProtocol {
    pub fn new(pool: AgentPool, prompts: Arc<PromptBuilder>) -> Self {
        Self { pool, prompts }
    }

    /// Ask `current_player` whether they accuse anyone.
    ///
    /// Players in `already_initiated` are still asked; their prompt says they
    /// may not accuse again, but the reply is honored as given.
    pub async fn check_initiation(
        &self,
        current_player: &str,
        roles: &BTreeMap<String, Role>,
        history: &[Turn],
        already_initiated: &BTreeSet<String>,
    ) -> GameResult<Option<String>> {
        let can_initiate = !already_initiated.contains(current_player);
        let task = self.prompts.vote_initiation_prompt(history, can_initiate);
        let request = DecisionRequest::for_decision::<VoteInitiationDecision>(
            DecisionKind::VoteInitiation,
            self.prompts.system_prompt(),
            self.prompts.compose(role_of(roles, current_player)?, &task),
        );
        let decision: VoteInitiationDecision = self.pool.decide(current_player, &request).await?;
        let suspect = decision.suspect();
        if let Some(suspect) = &suspect {
            info!(initiator = current_player, suspect = %suspect, "Vote initiated");
        }
        Ok(suspect)
    }

    /// Poll every player in `roles` once, in nickname order.
    ///
    /// A ballot that cannot be obtained or parsed counts as "no".
    pub async fn conduct_vote(
        &self,
        initiator: &str,
        suspect: &str,
        roles: &BTreeMap<String, Role>,
        history: &[Turn],
    ) -> VoteAttempt {
        let task = self.prompts.vote_decision_prompt(history, initiator, suspect);
        let mut votes = BTreeMap::new();

        for (voter, role) in roles {
            let request = DecisionRequest::for_decision::<BallotDecision>(
                DecisionKind::Ballot,
                self.prompts.system_prompt(),
                self.prompts.compose(role, &task),
            );
            let vote_yes = match self.pool.decide::<BallotDecision>(voter, &request).await {
                Ok(ballot) => ballot.vote_yes,
                Err(e) => {
                    warn!(voter = %voter, error = %e, "Ballot failed, counting as no");
                    false
                }
            };
            votes.insert(voter.clone(), vote_yes);
        }

        let attempt = VoteAttempt::new(initiator, suspect, votes);
        info!(
            initiator,
            suspect,
            yes = attempt.yes_count(),
            total = attempt.votes.len(),
            passed = attempt.passed,
            "Vote concluded"
        );
        attempt
    }
}
