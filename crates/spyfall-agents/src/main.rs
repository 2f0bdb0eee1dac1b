use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;

use spyfall_agents::agents::openrouter::OpenRouterFactory;
use spyfall_agents::agents::recording::{RecordingFactory, Transcript};
use spyfall_agents::agents::AgentFactory;
use spyfall_agents::credentials::{resolve_credential, DEFAULT_KEY_FILE};
use spyfall_agents::game_log::GameLog;
use spyfall_agents::logging;
use spyfall_agents::{GameConfig, Orchestrator, PromptBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a Spyfall game between language-model agents", long_about = None)]
struct Cli {
    /// Path to the game configuration YAML
    config: PathBuf,

    /// Console log level (RUST_LOG takes precedence; defaults to the config's logging.log_level)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// YAML file holding `openrouter_api_key`, used when the keyring has no entry
    #[arg(long, default_value = DEFAULT_KEY_FILE)]
    api_key_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GameConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let level = cli
        .log_level
        .map(LogLevel::directive)
        .unwrap_or_else(|| config.logging.tracing_directive());
    logging::init(level, &config.logging)?;

    let prompts = PromptBuilder::from_config(&config.prompts).context("failed to load prompts")?;
    let api_key = resolve_credential(&cli.api_key_file)?;
    let openrouter: Arc<dyn AgentFactory> =
        Arc::new(OpenRouterFactory::new(config.agent.clone(), api_key)?);

    let (factory, transcript): (Arc<dyn AgentFactory>, Option<Transcript>) =
        if config.logging.save_full_prompts {
            let recording = RecordingFactory::new(openrouter);
            let transcript = recording.transcript();
            (Arc::new(recording), Some(transcript))
        } else {
            (openrouter, None)
        };

    info!(
        config = %cli.config.display(),
        base_url = %config.agent.base_url,
        players = config.players.len(),
        "Spyfall arena starting"
    );

    let mut orchestrator = Orchestrator::new(config, factory, prompts)?;
    let game = orchestrator.run_game().await;

    let exchanges = transcript.map(|t| t.snapshot());
    let path = GameLog::write_final(&game, orchestrator.config(), exchanges.as_deref())?;

    println!("Game {} finished ({} rounds)", game.game_id, game.rounds_data.len());
    let mut standings: Vec<(&String, &i32)> = game.player_scores.iter().collect();
    standings.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (nickname, score) in standings {
        println!("  {nickname:<16} {score}");
    }
    if !game.errors.is_empty() {
        println!("{} round(s) ended in error; see the log for details", game.errors.len());
    }
    println!("Log written to {}", path.display());

    Ok(())
}
