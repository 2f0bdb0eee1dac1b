//! Spyfall core rules
//!
//! Everything in this crate is deterministic and free of I/O:
//! - Game and round phase state machines with explicit transition tables
//! - Round and game records (turns, vote attempts, spy guesses, errors)
//! - Seeded role assignment (one spy, shared location)
//! - Turn rotation and target eligibility
//! - Round scoring
//!
//! Agent-driven protocols and the orchestration loop live in `spyfall-agents`;
//! they only feed decisions back into the types defined here.

pub mod error;
pub mod game;
pub mod phase;
pub mod roles;
pub mod rotation;
pub mod round;
pub mod scoring;
pub mod types;

pub use error::{GameError, GameResult};
pub use game::GameState;
pub use phase::{GamePhase, RoundPhase};
pub use roles::{GameRng, RoleAssigner};
pub use rotation::{next_asker, valid_targets};
pub use round::RoundState;
pub use scoring::score_round;
pub use types::{EndingCondition, ErrorRecord, Role, SpyGuess, Turn, VoteAttempt};
