//! End-to-end games driven by scripted in-process agents.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use spyfall_agents::agents::recording::RecordingFactory;
use spyfall_agents::agents::{Agent, AgentFactory, DecisionKind, DecisionRequest};
use spyfall_agents::config::PlayerConfig;
use spyfall_agents::{GameConfig, Orchestrator, PromptBuilder};
use spyfall_core::{
    EndingCondition, GameError, GamePhase, GameResult, RoleAssigner, RoundPhase, RoundState,
};

type Reply = dyn Fn(&str, &DecisionRequest) -> GameResult<Value> + Send + Sync;

/// Every agent answers through one shared closure keyed on the player.
struct ScriptedFactory {
    reply: Arc<Reply>,
    calls: Arc<Mutex<Vec<(String, DecisionKind)>>>,
}

impl ScriptedFactory {
    fn new(reply: impl Fn(&str, &DecisionRequest) -> GameResult<Value> + Send + Sync + 'static) -> Self {
        Self {
            reply: Arc::new(reply),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl AgentFactory for ScriptedFactory {
    fn create(&self, player: &PlayerConfig) -> GameResult<Box<dyn Agent>> {
        Ok(Box::new(ScriptedAgent {
            nickname: player.nickname.clone(),
            reply: Arc::clone(&self.reply),
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct ScriptedAgent {
    nickname: String,
    reply: Arc<Reply>,
    calls: Arc<Mutex<Vec<(String, DecisionKind)>>>,
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn decide(&self, request: &DecisionRequest) -> GameResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((self.nickname.clone(), request.kind));
        (self.reply)(&self.nickname, request)
    }
}

fn config(players: &[&str], locations: &[&str], rounds: u32, max_turns: u32) -> GameConfig {
    let players = players
        .iter()
        .map(|nickname| format!("  - {{nickname: {nickname}, model_name: test/model}}"))
        .collect::<Vec<_>>()
        .join("\n");
    let yaml = format!(
        "game:\n  num_rounds: {rounds}\n  max_turns_per_round: {max_turns}\n  random_seed: 7\n\
         players:\n{players}\nlocations: [{}]\n",
        locations.join(", ")
    );
    GameConfig::from_yaml(&yaml).unwrap()
}

/// The (spy, location) the orchestrator will draw for round 1.
fn first_round_roles(config: &GameConfig) -> (String, String) {
    let mut assigner = RoleAssigner::new(config.game.seed());
    let (roles, location) = assigner
        .assign(&config.nicknames(), &config.locations)
        .unwrap();
    let spy = roles
        .into_iter()
        .find(|(_, role)| role.is_spy)
        .map(|(nickname, _)| nickname)
        .unwrap();
    (spy, location)
}

/// Players offered as question targets in a question prompt.
fn offered_targets(prompt: &str) -> Vec<String> {
    let marker = "Choose one of the following players to question: ";
    let start = prompt.find(marker).unwrap() + marker.len();
    let end = start + prompt[start..].find(".\n").unwrap();
    prompt[start..end].split(", ").map(str::to_string).collect()
}

fn no_vote() -> Value {
    json!({"initiate_vote": false, "suspect_nickname": null})
}

fn no_guess() -> Value {
    json!({"make_guess": false, "location_guess": null})
}

fn ask(target: &str) -> Value {
    json!({"target_nickname": target, "question": "What brings you here?"})
}

fn answer() -> Value {
    json!({"answer": "Same as everyone else."})
}

/// Plays quietly: never guesses, never accuses, questions the first offered target.
fn quiet(_nickname: &str, request: &DecisionRequest) -> GameResult<Value> {
    Ok(match request.kind {
        DecisionKind::SpyGuess => no_guess(),
        DecisionKind::VoteInitiation => no_vote(),
        DecisionKind::Question => ask(&offered_targets(&request.user_prompt)[0]),
        DecisionKind::Answer => answer(),
        DecisionKind::Ballot => json!({"vote_yes": false}),
    })
}

fn orchestrator(config: GameConfig, factory: ScriptedFactory) -> Orchestrator {
    Orchestrator::new(config, Arc::new(factory), PromptBuilder::default()).unwrap()
}

fn only_round(game: &spyfall_core::GameState) -> &RoundState {
    assert_eq!(game.rounds_data.len(), 1);
    &game.rounds_data[0]
}

#[tokio::test]
async fn spy_guesses_correctly_on_first_turn() {
    let config = config(&["ana", "bo", "cy", "dee"], &["Bank", "Zoo", "Ship"], 1, 10);
    let (spy, location) = first_round_roles(&config);
    let target = spy.clone();
    let factory = ScriptedFactory::new(move |_, request| match request.kind {
        DecisionKind::SpyGuess => Ok(json!({"make_guess": true, "location_guess": location})),
        // Route the first question to the spy so they ask next.
        DecisionKind::Question => Ok(ask(&target)),
        _ => quiet("", request),
    });

    let game = orchestrator(config, factory).run_game().await;
    let round = only_round(&game);

    assert_eq!(round.ending_condition, Some(EndingCondition::SpyGuess));
    assert!(round.spy_guess.as_ref().unwrap().correct);
    assert!(round.conversation_history.len() <= 1);
    for (nickname, score) in &round.round_scores {
        let expected = if *nickname == spy { 4 } else { 0 };
        assert_eq!(*score, expected, "{nickname}");
    }
    assert_eq!(game.player_scores, round.round_scores);
    assert_eq!(round.phase, RoundPhase::Completed);
    assert_eq!(game.phase, GamePhase::Completed);
}

#[tokio::test]
async fn civilian_initiator_convicts_spy() {
    let config = config(&["ana", "bo", "cy", "dee"], &["Bank", "Zoo"], 1, 10);
    let (spy, _) = first_round_roles(&config);
    let suspect = spy.clone();
    let factory = ScriptedFactory::new(move |nickname, request| match request.kind {
        DecisionKind::VoteInitiation if nickname != suspect => {
            Ok(json!({"initiate_vote": true, "suspect_nickname": suspect}))
        }
        DecisionKind::Ballot => Ok(json!({"vote_yes": true})),
        _ => quiet(nickname, request),
    });

    let game = orchestrator(config, factory).run_game().await;
    let round = only_round(&game);

    assert_eq!(round.ending_condition, Some(EndingCondition::Vote));
    assert_eq!(round.votes.len(), 1);
    let vote = &round.votes[0];
    assert!(vote.passed);
    assert_eq!(vote.suspect, spy);
    assert_eq!(vote.votes.len(), 4);
    assert!(round.players_who_voted.contains(&vote.initiator));

    for (nickname, score) in &round.round_scores {
        let expected = if *nickname == spy {
            0
        } else if *nickname == vote.initiator {
            2
        } else {
            1
        };
        assert_eq!(*score, expected, "{nickname}");
    }
}

#[tokio::test]
async fn convicting_a_civilian_rewards_the_spy() {
    let config = config(&["ana", "bo", "cy"], &["Bank", "Zoo"], 1, 10);
    let (spy, _) = first_round_roles(&config);
    let civilians: Vec<String> = config
        .nicknames()
        .into_iter()
        .filter(|nickname| *nickname != spy)
        .collect();
    let factory = ScriptedFactory::new(move |nickname, request| match request.kind {
        DecisionKind::VoteInitiation => {
            let suspect = civilians.iter().find(|c| c.as_str() != nickname).unwrap();
            Ok(json!({"initiate_vote": true, "suspect_nickname": suspect}))
        }
        DecisionKind::Ballot => Ok(json!({"vote_yes": true})),
        _ => quiet(nickname, request),
    });

    let game = orchestrator(config, factory).run_game().await;
    let round = only_round(&game);

    assert_eq!(round.ending_condition, Some(EndingCondition::Vote));
    assert_ne!(round.votes[0].suspect, spy);
    for (nickname, score) in &round.round_scores {
        let expected = if *nickname == spy { 4 } else { 0 };
        assert_eq!(*score, expected, "{nickname}");
    }
}

#[tokio::test]
async fn wrong_spy_guess_still_ends_the_round() {
    let config = config(&["ana", "bo", "cy"], &["Bank", "Zoo", "Ship"], 1, 10);
    let (spy, location) = first_round_roles(&config);
    let wrong = ["Bank", "Zoo", "Ship"]
        .into_iter()
        .find(|l| *l != location)
        .unwrap()
        .to_string();
    let target = spy.clone();
    let factory = ScriptedFactory::new(move |_, request| match request.kind {
        DecisionKind::SpyGuess => Ok(json!({"make_guess": true, "location_guess": wrong})),
        DecisionKind::Question => Ok(ask(&target)),
        _ => quiet("", request),
    });

    let game = orchestrator(config, factory).run_game().await;
    let round = only_round(&game);

    assert_eq!(round.ending_condition, Some(EndingCondition::SpyGuess));
    let guess = round.spy_guess.as_ref().unwrap();
    assert!(!guess.correct);
    assert_eq!(guess.actual_location, location);
    // The guess comes before any further questioning.
    let expected_turns = usize::from(spy != "ana");
    assert_eq!(round.conversation_history.len(), expected_turns);
    assert!(round.votes.is_empty());
    for (nickname, score) in &round.round_scores {
        let expected = if *nickname == spy { 2 } else { 0 };
        assert_eq!(*score, expected, "{nickname}");
    }
}

#[tokio::test]
async fn unvalidated_config_is_rejected_up_front() {
    let mut config = config(&["ana", "bo", "cy"], &["Bank"], 2, 5);
    config.locations.clear();
    let result = Orchestrator::new(
        config,
        Arc::new(ScriptedFactory::new(quiet)),
        PromptBuilder::default(),
    );
    assert!(matches!(result, Err(GameError::InvalidInput(msg)) if msg.contains("locations")));
}

#[tokio::test]
async fn game_events_reach_the_execution_log() {
    let dir = tempfile::tempdir().unwrap();
    let layer =
        spyfall_agents::logging::execution_log_layer(dir.path(), "info").unwrap();
    let subscriber = tracing_subscriber::layer::SubscriberExt::with(
        tracing_subscriber::registry(),
        layer,
    );
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = config(&["ana", "bo", "cy"], &["Bank"], 2, 2);
    orchestrator(config, ScriptedFactory::new(quiet)).run_game().await;

    let log = dir.path().join(spyfall_agents::logging::EXECUTION_LOG_FILE);
    let text = std::fs::read_to_string(log).unwrap();
    assert_eq!(text.matches("Round ended").count(), 2);
    assert!(text.contains("Game completed"));
    // Roles are only logged at debug.
    assert!(!text.contains("Roles assigned"));
}

#[tokio::test]
async fn quiet_round_hits_turn_limit() {
    let config = config(&["ana", "bo", "cy", "dee"], &["Bank"], 1, 5);
    let (spy, _) = first_round_roles(&config);
    let game = orchestrator(config, ScriptedFactory::new(quiet)).run_game().await;
    let round = only_round(&game);

    assert_eq!(round.ending_condition, Some(EndingCondition::TurnLimitReached));
    assert_eq!(round.conversation_history.len(), 5);
    for (nickname, score) in &round.round_scores {
        let expected = if *nickname == spy { 2 } else { 0 };
        assert_eq!(*score, expected, "{nickname}");
    }
    assert!(game.errors.is_empty());
}

#[tokio::test]
async fn rotation_follows_answerer_and_skips_previous_asker() {
    let config = config(&["ana", "bo", "cy", "dee"], &["Bank"], 1, 6);
    let game = orchestrator(config, ScriptedFactory::new(quiet)).run_game().await;
    let history = &only_round(&game).conversation_history;

    assert_eq!(history[0].asker_nickname, "ana");
    for (i, turn) in history.iter().enumerate() {
        assert_eq!(turn.turn_number as usize, i + 1);
        assert_ne!(turn.asker_nickname, turn.answerer_nickname);
        if i > 0 {
            let previous = &history[i - 1];
            assert_eq!(turn.asker_nickname, previous.answerer_nickname);
            assert_ne!(turn.answerer_nickname, previous.asker_nickname);
        }
    }
}

#[tokio::test]
async fn malformed_response_ends_round_but_not_game() {
    let config = config(&["ana", "bo", "cy"], &["Bank", "Zoo"], 2, 10);
    let factory = ScriptedFactory::new(|nickname, request| match request.kind {
        DecisionKind::Answer => Ok(json!({"response": 42})),
        _ => quiet(nickname, request),
    });

    let game = orchestrator(config, factory).run_game().await;

    assert_eq!(game.phase, GamePhase::Completed);
    assert_eq!(game.rounds_data.len(), 2);
    assert_eq!(game.current_round, 2);
    assert_eq!(game.errors.len(), 2);
    for (round, error) in game.rounds_data.iter().zip(&game.errors) {
        assert_eq!(round.ending_condition, Some(EndingCondition::Error));
        assert_eq!(round.phase, RoundPhase::Completed);
        assert!(round.conversation_history.is_empty());
        assert_eq!(round.round_scores[&round.spy_nickname], 2);
        assert_eq!(error.error_type, "invalid_agent_response");
        assert_eq!(error.round_number, round.round_number);
        assert_eq!(error.player_nickname.as_deref(), Some("ana"));
        assert!(error.recovered);
    }
}

#[tokio::test]
async fn unreachable_agent_is_recorded_as_error() {
    let config = config(&["ana", "bo", "cy"], &["Bank"], 1, 10);
    let factory = ScriptedFactory::new(|nickname, request| match request.kind {
        DecisionKind::VoteInitiation => Err(GameError::unavailable("connection reset")),
        _ => quiet(nickname, request),
    });

    let game = orchestrator(config, factory).run_game().await;
    assert_eq!(only_round(&game).ending_condition, Some(EndingCondition::Error));
    assert_eq!(game.errors[0].error_type, "agent_unavailable");
}

#[tokio::test]
async fn two_players_run_out_of_targets() {
    let config = config(&["ana", "bo"], &["Bank"], 1, 5);
    let game = orchestrator(config, ScriptedFactory::new(quiet)).run_game().await;
    let round = only_round(&game);

    assert_eq!(round.ending_condition, Some(EndingCondition::Error));
    assert_eq!(round.conversation_history.len(), 1);
    assert_eq!(game.errors[0].error_type, "invalid_input");
    assert_eq!(game.errors[0].player_nickname.as_deref(), Some("bo"));
    assert_eq!(game.errors[0].turn_number, Some(2));
}

#[tokio::test]
async fn failed_vote_returns_to_questioning() {
    let config = config(&["ana", "bo", "cy"], &["Bank"], 1, 3);
    let factory = ScriptedFactory::new(|nickname, request| match request.kind {
        DecisionKind::VoteInitiation if nickname == "ana" => {
            Ok(json!({"initiate_vote": true, "suspect_nickname": "cy"}))
        }
        // cy's ballot is malformed and counts as no.
        DecisionKind::Ballot if nickname == "cy" => Ok(json!({"ballot": "yes"})),
        DecisionKind::Ballot => Ok(json!({"vote_yes": true})),
        _ => quiet(nickname, request),
    });

    let game = orchestrator(config, factory).run_game().await;
    let round = only_round(&game);

    assert!(!round.votes.is_empty());
    let first = &round.votes[0];
    assert_eq!(first.initiator, "ana");
    assert!(!first.passed);
    assert_eq!(first.votes.get("cy"), Some(&false));
    assert_eq!(round.ending_condition, Some(EndingCondition::TurnLimitReached));
    assert_eq!(round.conversation_history.len(), 3);
}

#[tokio::test]
async fn same_seed_replays_the_same_game() {
    let config = config(&["ana", "bo", "cy", "dee", "eve"], &["Bank", "Zoo", "Ship", "Farm"], 3, 4);
    let mut orchestrator = orchestrator(config, ScriptedFactory::new(quiet));

    let first = orchestrator.run_game().await;
    let second = orchestrator.run_game().await;

    assert_ne!(first.game_id, second.game_id);
    assert_eq!(first.player_scores, second.player_scores);
    for (a, b) in first.rounds_data.iter().zip(&second.rounds_data) {
        assert_eq!(a.role_assignments, b.role_assignments);
        assert_eq!(a.location, b.location);
        let turns = |r: &RoundState| {
            r.conversation_history
                .iter()
                .map(|t| (t.asker_nickname.clone(), t.answerer_nickname.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(turns(a), turns(b));
    }
}

#[tokio::test]
async fn agents_are_queried_sequentially_in_rule_order() {
    let config = config(&["ana", "bo", "cy"], &["Bank"], 1, 1);
    let (spy, _) = first_round_roles(&config);
    let factory = ScriptedFactory::new(quiet);
    let calls = Arc::clone(&factory.calls);

    orchestrator(config, factory).run_game().await;

    let calls = calls.lock().unwrap().clone();
    let kinds: Vec<DecisionKind> = calls.iter().map(|(_, kind)| *kind).collect();
    let mut expected = Vec::new();
    if spy == "ana" {
        expected.push(DecisionKind::SpyGuess);
    }
    expected.extend([
        DecisionKind::VoteInitiation,
        DecisionKind::Question,
        DecisionKind::Answer,
    ]);
    assert_eq!(kinds, expected);
    assert!(calls[..calls.len() - 1].iter().all(|(nickname, _)| nickname == "ana"));
}

#[tokio::test]
async fn recording_factory_captures_every_exchange() {
    let config = config(&["ana", "bo", "cy"], &["Bank"], 1, 2);
    let recording = RecordingFactory::new(Arc::new(ScriptedFactory::new(quiet)));
    let transcript = recording.transcript();

    let game = Orchestrator::new(config, Arc::new(recording), PromptBuilder::default())
        .unwrap()
        .run_game()
        .await;

    let entries = transcript.snapshot();
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.response.is_some() && e.error.is_none()));
    let answers = entries
        .iter()
        .filter(|e| e.kind == DecisionKind::Answer)
        .count();
    assert_eq!(answers, only_round(&game).conversation_history.len());
}
