//! Final game record written to `logging.output_dir`.
//!
//! One pretty-printed JSON file per game, named
//! `{YYYYmmdd_HHMMSS}_game_{id}.json`. The file is written once, after the
//! game completes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use spyfall_core::{ErrorRecord, GamePhase, GameState, RoundState};
use tracing::info;

use crate::agents::recording::PromptExchange;
use crate::config::{GameConfig, PlayerConfig};
use crate::prompts::PROMPT_VERSION;

/// Serialized shape of the log file.
#[derive(Debug, Serialize)]
pub struct GameLog<'a> {
    pub game_id: &'a str,
    pub timestamp: DateTime<Utc>,
    pub prompt_version: &'static str,
    pub config_snapshot: &'a GameConfig,
    pub players: &'a [PlayerConfig],
    pub rounds: &'a [RoundState],
    pub final_scores: &'a BTreeMap<String, i32>,
    pub status: GamePhase,
    pub errors: &'a [ErrorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_transcript: Option<&'a [PromptExchange]>,
}

impl<'a> GameLog<'a> {
    pub fn new(
        game: &'a GameState,
        config: &'a GameConfig,
        transcript: Option<&'a [PromptExchange]>,
    ) -> Self {
        Self {
            game_id: &game.game_id,
            timestamp: Utc::now(),
            prompt_version: PROMPT_VERSION,
            config_snapshot: config,
            players: &config.players,
            rounds: &game.rounds_data,
            final_scores: &game.player_scores,
            status: game.phase,
            errors: &game.errors,
            prompt_transcript: transcript,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_game_{}.json",
            self.timestamp.format("%Y%m%d_%H%M%S"),
            self.game_id
        )
    }

    /// Write into `dir`, creating it if needed. Returns the file path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self).context("failed to serialize game log")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write game log {}", path.display()))?;
        info!(path = %path.display(), "Game log saved");
        Ok(path)
    }

    /// Build and write the log for a finished game into `config.logging.output_dir`.
    pub fn write_final(
        game: &GameState,
        config: &GameConfig,
        transcript: Option<&[PromptExchange]>,
    ) -> Result<PathBuf> {
        GameLog::new(game, config, transcript).write_to(&config.logging.output_dir)
    }
}
