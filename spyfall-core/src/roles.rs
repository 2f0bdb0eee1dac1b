//! Seeded role assignment.
//!
//! One `RoleAssigner` lives for a whole game. Its ChaCha8 stream is seeded
//! once, so the sequence of (location, spy) picks across rounds depends only
//! on the seed and the player/location lists.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{GameError, GameResult};
use crate::types::Role;

/// Deterministic RNG wrapper.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Choose a random element from a slice; `None` when empty.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.inner)
    }
}

/// Picks the round's location and spy.
#[derive(Clone, Debug)]
pub struct RoleAssigner {
    rng: GameRng,
}

impl RoleAssigner {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }

    /// Assign one spy and a shared location.
    ///
    /// The location is drawn first, then the spy, both uniformly. Every other
    /// player receives the location.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `players` or `locations` is empty.
    pub fn assign(
        &mut self,
        players: &[String],
        locations: &[String],
    ) -> GameResult<(BTreeMap<String, Role>, String)> {
        if players.is_empty() {
            return Err(GameError::InvalidInput("player list cannot be empty".into()));
        }
        if locations.is_empty() {
            return Err(GameError::InvalidInput(
                "location list cannot be empty".into(),
            ));
        }

        let location = self
            .rng
            .choose(locations)
            .cloned()
            .ok_or_else(|| GameError::InvalidInput("location list cannot be empty".into()))?;
        let spy = self
            .rng
            .choose(players)
            .cloned()
            .ok_or_else(|| GameError::InvalidInput("player list cannot be empty".into()))?;

        let roles = players
            .iter()
            .map(|nickname| {
                let role = if *nickname == spy {
                    Role::spy()
                } else {
                    Role::civilian(location.clone())
                };
                (nickname.clone(), role)
            })
            .collect();

        Ok((roles, location))
    }
}
