//! Game configuration loaded from YAML.
//!
//! ```yaml
//! game:
//!   num_rounds: 3
//!   max_turns_per_round: 20
//!   random_seed: 42
//! players:
//!   - { nickname: ana, model_name: openai/gpt-4o-mini, temperature: 0.7 }
//!   - { nickname: bo, model_name: anthropic/claude-3-haiku }
//! locations: [Bank, Beach, Casino]
//! logging:
//!   output_dir: logs
//!   log_level: INFO
//! ```
//!
//! Every section except `players` and `locations` has defaults. A non-empty
//! `SPYFALL_API_BASE_URL` overrides `agent.base_url`, including one set in the file.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spyfall_core::GameError;
use thiserror::Error;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const ENV_BASE_URL: &str = "SPYFALL_API_BASE_URL";

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 12;
const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error parsing YAML file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Invalid(String),
}

impl From<ConfigError> for GameError {
    fn from(err: ConfigError) -> Self {
        GameError::InvalidInput(err.to_string())
    }
}

/// One seat at the table and the model that plays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub nickname: String,
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRulesConfig {
    pub num_rounds: u32,
    pub max_turns_per_round: u32,
    pub random_seed: Option<u64>,
}

impl Default for GameRulesConfig {
    fn default() -> Self {
        Self {
            num_rounds: 3,
            max_turns_per_round: 20,
            random_seed: Some(42),
        }
    }
}

impl GameRulesConfig {
    pub fn seed(&self) -> u64 {
        self.random_seed.unwrap_or(42)
    }
}

/// Optional template overrides; unset paths use the built-in prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system_prompt_template: Option<PathBuf>,
    pub civilian_role_template: Option<PathBuf>,
    pub spy_role_template: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub output_dir: PathBuf,
    pub save_full_prompts: bool,
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("logs"),
            save_full_prompts: false,
            log_level: "INFO".to_string(),
        }
    }
}

impl LoggingConfig {
    /// `tracing` filter directive for the configured level.
    pub fn tracing_directive(&self) -> &'static str {
        match self.log_level.as_str() {
            "DEBUG" => "debug",
            "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentEndpointConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AgentEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl AgentEndpointConfig {
    /// A non-empty `SPYFALL_API_BASE_URL` replaces whatever the file or default set.
    pub fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|url| !url.trim().is_empty()) {
            self.base_url = url;
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub game: GameRulesConfig,
    pub players: Vec<PlayerConfig>,
    pub locations: Vec<String>,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub agent: AgentEndpointConfig,
}

impl GameConfig {
    /// Load and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if !value.is_mapping() {
            return Err(ConfigError::Invalid(
                "YAML file is not a valid dictionary".into(),
            ));
        }
        let mut config: GameConfig = serde_yaml::from_value(value)?;
        config.logging.log_level = config.logging.log_level.to_uppercase();
        config
            .agent
            .apply_base_url_override(env::var(ENV_BASE_URL).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players.len()) {
            return Err(ConfigError::Invalid(format!(
                "players must contain between {MIN_PLAYERS} and {MAX_PLAYERS} entries, got {}",
                self.players.len()
            )));
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if player.nickname.trim().is_empty() {
                return Err(ConfigError::Invalid("player nickname cannot be empty".into()));
            }
            if player.model_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "player '{}' has an empty model_name",
                    player.nickname
                )));
            }
            if !(0.0..=2.0).contains(&player.temperature) {
                return Err(ConfigError::Invalid(format!(
                    "player '{}' temperature {} is outside 0.0..=2.0",
                    player.nickname, player.temperature
                )));
            }
            if !seen.insert(player.nickname.as_str()) {
                return Err(ConfigError::Invalid("Player nicknames must be unique".into()));
            }
        }

        if self.locations.is_empty() {
            return Err(ConfigError::Invalid("locations cannot be empty".into()));
        }
        let unique: HashSet<&str> = self.locations.iter().map(String::as_str).collect();
        if unique.len() != self.locations.len() {
            return Err(ConfigError::Invalid("Locations must be unique".into()));
        }

        if self.game.num_rounds == 0 {
            return Err(ConfigError::Invalid("num_rounds must be greater than 0".into()));
        }
        if self.game.max_turns_per_round == 0 {
            return Err(ConfigError::Invalid(
                "max_turns_per_round must be greater than 0".into(),
            ));
        }

        if self.agent.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "agent.timeout_secs must be greater than 0".into(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {LOG_LEVELS:?}"
            )));
        }

        Ok(())
    }

    /// Player nicknames in configured order.
    pub fn nicknames(&self) -> Vec<String> {
        self.players.iter().map(|p| p.nickname.clone()).collect()
    }
}
