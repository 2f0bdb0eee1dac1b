//! Turn rotation rules.
//!
//! The player who answers becomes the next asker, and an asker may target
//! anyone except themselves and the player who just questioned them.

/// Players the asker may question, in the given player order.
pub fn valid_targets(
    asker: &str,
    previous_asker: Option<&str>,
    players: &[String],
) -> Vec<String> {
    players
        .iter()
        .filter(|nickname| nickname.as_str() != asker && Some(nickname.as_str()) != previous_asker)
        .cloned()
        .collect()
}

/// Next asker after a turn: whoever just answered.
pub fn next_asker(answerer: &str) -> &str {
    answerer
}
