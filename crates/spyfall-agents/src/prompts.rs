//! Prompt templates and task prompt rendering.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever template or task text
//! changes, so game logs can be tied to the prompts that produced them.

use std::path::Path;

use spyfall_core::{GameError, GameResult, Role, Turn};

use crate::config::PromptsConfig;

/// Prompt version. Bump on any template content change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Placeholder replaced with the round's location in the civilian template.
pub const LOCATION_PLACEHOLDER: &str = "{{ location }}";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are playing Spyfall, a social deduction game, against other AI players.

Every round all players but one know a secret location. The remaining player \
is the spy and does not know where they are. Players take turns asking each \
other questions about the location. Civilians try to expose the spy without \
revealing the location; the spy tries to blend in and work out the location.

Any player may accuse someone once per round. An accusation succeeds only if \
every player votes yes. On their own turn the spy may stop the round by \
guessing the location.

Always answer with a single JSON object in exactly the format requested. Do \
not add commentary outside the JSON.";

pub const DEFAULT_CIVILIAN_TEMPLATE: &str = "\
You are a civilian. The location is: {{ location }}.
Ask and answer questions that prove you know the location without making it \
obvious to the spy. Watch for answers that are vague or slightly wrong.";

pub const DEFAULT_SPY_TEMPLATE: &str = "\
You are the spy. You do not know the location.
Listen carefully to the other players, give answers that could fit many \
places, and try to deduce the location before you are caught.";

/// Renders every prompt the protocols send.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
    civilian_template: String,
    spy_template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            civilian_template: DEFAULT_CIVILIAN_TEMPLATE.to_string(),
            spy_template: DEFAULT_SPY_TEMPLATE.to_string(),
        }
    }
}

impl PromptBuilder {
    /// Built-in templates, overridden by any path set in `config`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a configured template file cannot be read.
    pub fn from_config(config: &PromptsConfig) -> GameResult<Self> {
        let mut builder = Self::default();
        if let Some(path) = &config.system_prompt_template {
            builder.system_prompt = read_template(path)?;
        }
        if let Some(path) = &config.civilian_role_template {
            builder.civilian_template = read_template(path)?;
        }
        if let Some(path) = &config.spy_role_template {
            builder.spy_template = read_template(path)?;
        }
        Ok(builder)
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn role_prompt(&self, role: &Role) -> String {
        if role.is_spy {
            self.spy_template.clone()
        } else {
            self.civilian_template
                .replace(LOCATION_PLACEHOLDER, role.location.as_deref().unwrap_or(""))
        }
    }

    pub fn question_prompt(&self, history: &[Turn], valid_targets: &[String]) -> String {
        format!(
            "{}\n\n\
             It is your turn to ask a question.\n\
             Choose one of the following players to question: {}.\n\
             Your response must be in the following JSON format:\n\
             {{\"target_nickname\": \"player_name\", \"question\": \"your_question_here\"}}",
            format_history(history),
            valid_targets.join(", ")
        )
    }

    pub fn answer_prompt(&self, history: &[Turn], asker: &str, question: &str) -> String {
        format!(
            "{}\n\n\
             {asker} asked you the following question: '{question}'\n\
             Your response must be in the following JSON format:\n\
             {{\"answer\": \"your_answer_here\"}}",
            format_history(history)
        )
    }

    pub fn vote_initiation_prompt(&self, history: &[Turn], can_initiate: bool) -> String {
        let history = format_history(history);
        if !can_initiate {
            return format!(
                "{history}\n\n\
                 You have already initiated a vote this round and cannot do so again.\n\
                 Your response must be in the following JSON format:\n\
                 {{\"initiate_vote\": false, \"suspect_nickname\": null}}"
            );
        }
        format!(
            "{history}\n\n\
             Do you want to initiate a vote to accuse someone of being the spy? \
             If so, provide the nickname of the player you suspect.\n\
             Your response must be in the following JSON format:\n\
             {{\"initiate_vote\": true_or_false, \"suspect_nickname\": \"player_name_or_null\"}}"
        )
    }

    pub fn vote_decision_prompt(&self, history: &[Turn], initiator: &str, suspect: &str) -> String {
        format!(
            "{}\n\n\
             {initiator} has accused {suspect} of being the spy. Do you agree?\n\
             Your response must be in the following JSON format:\n\
             {{\"vote_yes\": true_or_false}}",
            format_history(history)
        )
    }

    pub fn spy_guess_prompt(&self, history: &[Turn], locations: &[String]) -> String {
        format!(
            "{}\n\n\
             As the spy, you can choose to guess the location. \
             If you are correct, you win. If you are wrong, you lose.\n\
             Do you want to guess the location now? If so, choose from the list of available locations.\n\
             Available locations: {}\n\
             Your response must be in the following JSON format:\n\
             {{\"make_guess\": true_or_false, \"location_guess\": \"location_name_or_null\"}}",
            format_history(history),
            locations.join(", ")
        )
    }

    /// Role context followed by the task, as sent in the user message.
    pub fn compose(&self, role: &Role, task: &str) -> String {
        format!("{}\n{task}", self.role_prompt(role))
    }
}

fn read_template(path: &Path) -> GameResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        GameError::InvalidInput(format!(
            "could not load prompt template {}: {e}",
            path.display()
        ))
    })
}

/// Render the conversation so far for inclusion in a prompt.
pub fn format_history(history: &[Turn]) -> String {
    if history.is_empty() {
        return "The conversation has not started yet.".to_string();
    }
    let lines: Vec<String> = history
        .iter()
        .map(|turn| {
            format!(
                "Turn {}: {} asked {}: '{}'\n  {} answered: '{}'",
                turn.turn_number,
                turn.asker_nickname,
                turn.answerer_nickname,
                turn.question,
                turn.answerer_nickname,
                turn.answer
            )
        })
        .collect();
    format!("Conversation History:\n{}", lines.join("\n"))
}
