//! Round scoring.
//!
//! Precedence, first match wins:
//!
//! | Outcome                          | Spy | Civilians | Civilian initiator |
//! |----------------------------------|-----|-----------|--------------------|
//! | Spy guessed the location         | 4   | 0         | 0                  |
//! | First passed vote names the spy  | 0   | 1         | 2                  |
//! | First passed vote names a civilian | 4 | 0         | 0                  |
//! | No correct guess, no passed vote | 2   | 0         | 0                  |

use std::collections::BTreeMap;

use crate::round::RoundState;

pub const SPY_CORRECT_GUESS: i32 = 4;
pub const SPY_WRONGLY_CONVICTED_OTHER: i32 = 4;
pub const SPY_SURVIVES: i32 = 2;
pub const CIVILIAN_CONVICTS_SPY: i32 = 1;
pub const INITIATOR_CONVICTS_SPY: i32 = 2;

/// Points earned by every player in `role_assignments` for a finished round.
pub fn score_round(round: &RoundState) -> BTreeMap<String, i32> {
    let mut scores: BTreeMap<String, i32> = round
        .role_assignments
        .keys()
        .map(|nickname| (nickname.clone(), 0))
        .collect();
    let spy = round.spy_nickname.as_str();

    if round.spy_guess.as_ref().is_some_and(|guess| guess.correct) {
        set(&mut scores, spy, SPY_CORRECT_GUESS);
    } else if let Some(vote) = round.first_passed_vote() {
        if vote.suspect == spy {
            for civilian in round.civilians() {
                set(&mut scores, civilian, CIVILIAN_CONVICTS_SPY);
            }
            if vote.initiator != spy {
                // Overrides the civilian point rather than adding to it
                set(&mut scores, &vote.initiator, INITIATOR_CONVICTS_SPY);
            }
        } else {
            set(&mut scores, spy, SPY_WRONGLY_CONVICTED_OTHER);
        }
    } else {
        set(&mut scores, spy, SPY_SURVIVES);
    }

    scores
}

fn set(scores: &mut BTreeMap<String, i32>, nickname: &str, points: i32) {
    if let Some(score) = scores.get_mut(nickname) {
        *score = points;
    }
}
