//! Decision protocols run by the orchestrator.
//!
//! Each protocol owns an `AgentPool` and the shared `PromptBuilder`, renders
//! the prompt for one decision point, and validates the reply against the
//! round's rules before handing a record back.

pub mod spy_guess;
pub mod turn;
pub mod voting;

use std::collections::BTreeMap;

use spyfall_core::{GameError, GameResult, Role};

pub use spy_guess::SpyGuessCheck;
pub use turn::TurnProtocol;
pub use voting::VotingProtocol;

fn role_of<'a>(roles: &'a BTreeMap<String, Role>, nickname: &str) -> GameResult<&'a Role> {
    roles
        .get(nickname)
        .ok_or_else(|| GameError::InvalidInput(format!("no role assigned to '{nickname}'")))
}
