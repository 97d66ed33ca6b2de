use std::sync::mpsc::{self, Receiver};

use matchdash::dashboard::{format_reply, Dashboard};
use matchdash::state::{
    ChatRole, Delta, Prediction, ProviderCommand, Resource, Team, CHAT_ERROR_REPLY, CHAT_GREETING,
};

fn new_dashboard() -> (Dashboard, Receiver<ProviderCommand>) {
    let (tx, rx) = mpsc::channel();
    (Dashboard::new(tx), rx)
}

fn drain(rx: &Receiver<ProviderCommand>) -> Vec<ProviderCommand> {
    let mut out = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        out.push(cmd);
    }
    out
}

fn team(id: u32, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        country: None,
    }
}

fn prediction(home_team_id: u32, away_team_id: u32, confidence: f32) -> Prediction {
    Prediction {
        id: None,
        home_team_id,
        away_team_id,
        home_team: None,
        away_team: None,
        predicted_home_score: 2,
        predicted_away_score: 1,
        confidence,
        explanation: String::new(),
        created_at: None,
        league: None,
    }
}

#[test]
fn refresh_sets_loading_and_sends_one_command() {
    let (mut dashboard, rx) = new_dashboard();

    dashboard.refresh(Resource::Teams);

    assert!(dashboard.state.teams_loading);
    assert!(dashboard.state.teams_error.is_none());
    assert_eq!(drain(&rx), vec![ProviderCommand::FetchTeams]);
}

#[test]
fn successful_load_replaces_collection_and_clears_error() {
    let (mut dashboard, _rx) = new_dashboard();
    dashboard.state.teams = vec![team(9, "Old Boys")];
    dashboard.state.teams_error = Some("earlier failure".to_string());

    dashboard.refresh(Resource::Teams);
    dashboard.apply(Delta::SetTeams(vec![team(1, "Real Madrid"), team(2, "Barcelona")]));

    assert!(!dashboard.state.teams_loading);
    assert!(dashboard.state.teams_error.is_none());
    let names: Vec<&str> = dashboard.state.teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Real Madrid", "Barcelona"]);
}

#[test]
fn failed_reload_preserves_prior_collection() {
    let (mut dashboard, _rx) = new_dashboard();
    dashboard.apply(Delta::SetTeams(vec![team(1, "A"), team(2, "B")]));

    dashboard.refresh(Resource::Teams);
    dashboard.apply(Delta::TeamsFailed("connection refused".to_string()));

    assert!(!dashboard.state.teams_loading);
    assert_eq!(dashboard.state.teams.len(), 2);
    assert_eq!(dashboard.state.teams[0].name, "A");
    assert_eq!(dashboard.state.teams[1].name, "B");
    assert_eq!(
        dashboard.state.teams_error.as_deref(),
        Some("connection refused")
    );
}

#[test]
fn latest_applied_load_wins() {
    let (mut dashboard, _rx) = new_dashboard();

    // Two overlapping cycles: whichever result arrives last is displayed.
    dashboard.refresh(Resource::Teams);
    dashboard.refresh(Resource::Teams);
    dashboard.apply(Delta::SetTeams(vec![team(1, "stale")]));
    dashboard.apply(Delta::SetTeams(vec![team(2, "fresh")]));

    assert_eq!(dashboard.state.teams.len(), 1);
    assert_eq!(dashboard.state.teams[0].name, "fresh");
}

#[test]
fn predictions_failure_is_isolated_from_other_resources() {
    let (mut dashboard, _rx) = new_dashboard();
    dashboard.apply(Delta::SetTeams(vec![team(1, "A")]));

    dashboard.refresh(Resource::Predictions);
    dashboard.apply(Delta::PredictionsFailed("boom".to_string()));

    assert!(dashboard.state.predictions_error.is_some());
    assert!(dashboard.state.teams_error.is_none());
    assert_eq!(dashboard.state.teams.len(), 1);
}

#[test]
fn blank_chat_input_is_a_no_op() {
    let (mut dashboard, rx) = new_dashboard();

    dashboard.state.chat_input = String::new();
    dashboard.submit_chat();
    dashboard.state.chat_input = "   ".to_string();
    dashboard.submit_chat();

    assert_eq!(dashboard.state.chat_messages.len(), 1);
    assert_eq!(dashboard.state.chat_messages[0].content, CHAT_GREETING);
    assert!(!dashboard.state.chat_waiting);
    assert!(drain(&rx).is_empty());
}

#[test]
fn chat_submit_appends_user_message_and_waits() {
    let (mut dashboard, rx) = new_dashboard();
    dashboard.state.chat_input = "  Who wins tonight?  ".to_string();

    dashboard.submit_chat();

    assert_eq!(dashboard.state.chat_messages.len(), 2);
    let last = dashboard.state.chat_messages.last().unwrap();
    assert_eq!(last.role, ChatRole::User);
    assert_eq!(last.content, "Who wins tonight?");
    assert!(dashboard.state.chat_input.is_empty());
    assert!(dashboard.state.chat_waiting);
    assert!(dashboard.state.chat_stick_to_bottom);
    assert_eq!(
        drain(&rx),
        vec![ProviderCommand::SendChat {
            message: "Who wins tonight?".to_string()
        }]
    );
}

#[test]
fn chat_submit_while_waiting_is_ignored() {
    let (mut dashboard, rx) = new_dashboard();
    dashboard.state.chat_input = "first".to_string();
    dashboard.submit_chat();
    drain(&rx);

    dashboard.state.chat_input = "second".to_string();
    dashboard.submit_chat();

    assert_eq!(dashboard.state.chat_messages.len(), 2);
    assert_eq!(dashboard.state.chat_input, "second");
    assert!(drain(&rx).is_empty());
}

#[test]
fn chat_reply_appends_exactly_one_assistant_message() {
    let (mut dashboard, _rx) = new_dashboard();
    dashboard.state.chat_input = "hello".to_string();
    dashboard.submit_chat();

    dashboard.apply(Delta::ChatReply("Nice to meet you.".to_string()));

    assert_eq!(dashboard.state.chat_messages.len(), 3);
    let last = dashboard.state.chat_messages.last().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.content, "Nice to meet you.");
    assert!(!dashboard.state.chat_waiting);
}

#[test]
fn chat_failure_appends_fixed_error_and_returns_to_idle() {
    let (mut dashboard, _rx) = new_dashboard();
    dashboard.state.chat_input = "Real Madrid vs Barcelona".to_string();
    dashboard.submit_chat();

    dashboard.apply(Delta::ChatFailed("connection refused".to_string()));

    let last = dashboard.state.chat_messages.last().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.content, CHAT_ERROR_REPLY);
    assert!(!dashboard.state.chat_waiting);
    assert!(dashboard.state.chat_input.is_empty());
}

#[test]
fn reply_formatting_is_presence_only() {
    let decorated = format_reply("Liverpool win this match");
    assert_ne!(decorated, "Liverpool win this match");
    assert!(decorated.ends_with("Liverpool win this match"));

    assert_eq!(format_reply("Nice weather today."), "Nice weather today.");
}

#[test]
fn manual_prediction_requires_two_distinct_teams() {
    let (mut dashboard, rx) = new_dashboard();

    dashboard.predict_manual();
    assert!(drain(&rx).is_empty());

    dashboard.state.selected_team1 = Some(team(1, "Real Madrid"));
    dashboard.predict_manual();
    assert!(drain(&rx).is_empty());

    dashboard.state.selected_team2 = Some(team(1, "Real Madrid"));
    dashboard.predict_manual();

    assert!(!dashboard.state.predicting);
    assert!(drain(&rx).is_empty());
    assert!(
        dashboard
            .state
            .logs
            .iter()
            .any(|line| line.contains("two different teams"))
    );
}

#[test]
fn manual_prediction_end_to_end_triggers_one_refresh() {
    let (mut dashboard, rx) = new_dashboard();
    dashboard.apply(Delta::SetTeams(vec![
        team(1, "Real Madrid"),
        team(2, "Barcelona"),
    ]));
    dashboard.state.selected_team1 = Some(team(1, "Real Madrid"));
    dashboard.state.selected_team2 = Some(team(2, "Barcelona"));

    dashboard.predict_manual();
    assert!(dashboard.state.predicting);
    assert!(dashboard.state.manual_prediction.is_none());
    assert_eq!(
        drain(&rx),
        vec![ProviderCommand::PredictTeams {
            home_team_id: 1,
            away_team_id: 2
        }]
    );

    let result = prediction(1, 2, 85.5);
    dashboard.apply(Delta::ManualPredictionReady(result.clone()));

    assert!(!dashboard.state.predicting);
    assert_eq!(dashboard.state.manual_prediction, Some(result));
    assert!(dashboard.state.predictions_loading);
    assert_eq!(drain(&rx), vec![ProviderCommand::FetchPredictions]);
}

#[test]
fn manual_prediction_failure_leaves_no_result_and_no_refresh() {
    let (mut dashboard, rx) = new_dashboard();
    dashboard.state.selected_team1 = Some(team(1, "Real Madrid"));
    dashboard.state.selected_team2 = Some(team(2, "Barcelona"));
    dashboard.predict_manual();
    drain(&rx);

    dashboard.apply(Delta::ManualPredictionFailed("503".to_string()));

    assert!(!dashboard.state.predicting);
    assert!(dashboard.state.manual_prediction.is_none());
    assert!(drain(&rx).is_empty());
    assert!(
        dashboard
            .state
            .logs
            .iter()
            .any(|line| line.contains("Prediction failed"))
    );
}

#[test]
fn start_issues_all_initial_loads() {
    let (mut dashboard, rx) = new_dashboard();

    dashboard.start();

    let cmds = drain(&rx);
    assert!(cmds.contains(&ProviderCommand::FetchTeams));
    assert!(cmds.contains(&ProviderCommand::FetchMatches));
    assert!(cmds.contains(&ProviderCommand::FetchPredictions));
    assert!(dashboard.state.teams_loading);
    assert!(dashboard.state.matches_loading);
    assert!(dashboard.state.predictions_loading);
}
