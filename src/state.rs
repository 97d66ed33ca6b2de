use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const MAX_LOG_LINES: usize = 200;

pub const CHAT_GREETING: &str = "Hi! Ask me about match predictions.\n\
Try: 'Real Madrid vs Barcelona', 'Who will win Liverpool vs Chelsea?', 'Show me teams'";

/// Fixed assistant reply appended when the chat request fails.
pub const CHAT_ERROR_REPLY: &str =
    "Error connecting to server. Make sure the backend is running!";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMatch {
    pub id: u32,
    pub home_team: Team,
    pub away_team: Team,
    #[serde(default)]
    pub match_date: String,
    #[serde(default)]
    pub league: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<u32>,
    pub home_team_id: u32,
    pub away_team_id: u32,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    pub predicted_home_score: u32,
    pub predicted_away_score: u32,
    pub confidence: f32,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorStoreStatus {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub prediction_count: u64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// One of the three independently loaded collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Teams,
    Matches,
    Predictions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Teams,
    Matches,
    Predictions,
    Selector,
    Chat,
}

/// Results delivered from the provider thread back to the UI loop.
#[derive(Debug, Clone)]
pub enum Delta {
    SetTeams(Vec<Team>),
    TeamsFailed(String),
    SetMatches(Vec<UpcomingMatch>),
    MatchesFailed(String),
    SetPredictions(Vec<Prediction>),
    PredictionsFailed(String),
    ChatReply(String),
    ChatFailed(String),
    ManualPredictionReady(Prediction),
    ManualPredictionFailed(String),
    SetVectorStatus(VectorStoreStatus),
    Log(String),
}

/// Requests the UI loop sends to the provider thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchTeams,
    FetchMatches,
    FetchPredictions,
    PredictTeams {
        home_team_id: u32,
        away_team_id: u32,
    },
    GeneratePrediction {
        match_id: u32,
    },
    SendChat {
        message: String,
    },
    FetchVectorStatus,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub teams: Vec<Team>,
    pub teams_loading: bool,
    pub teams_error: Option<String>,
    pub teams_selected: usize,

    pub matches: Vec<UpcomingMatch>,
    pub matches_loading: bool,
    pub matches_error: Option<String>,
    pub matches_selected: usize,

    pub predictions: Vec<Prediction>,
    pub predictions_loading: bool,
    pub predictions_error: Option<String>,
    pub predictions_scroll: u16,

    pub chat_messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_waiting: bool,
    pub chat_scroll: u16,
    pub chat_stick_to_bottom: bool,

    pub selected_team1: Option<Team>,
    pub selected_team2: Option<Team>,
    pub predicting: bool,
    pub manual_prediction: Option<Prediction>,

    pub vector_status: Option<VectorStoreStatus>,

    pub focus: Panel,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            teams: Vec::with_capacity(32),
            teams_loading: false,
            teams_error: None,
            teams_selected: 0,
            matches: Vec::with_capacity(32),
            matches_loading: false,
            matches_error: None,
            matches_selected: 0,
            predictions: Vec::with_capacity(32),
            predictions_loading: false,
            predictions_error: None,
            predictions_scroll: 0,
            chat_messages: vec![ChatMessage::assistant(CHAT_GREETING)],
            chat_input: String::new(),
            chat_waiting: false,
            chat_scroll: 0,
            chat_stick_to_bottom: true,
            selected_team1: None,
            selected_team2: None,
            predicting: false,
            manual_prediction: None,
            vector_status: None,
            focus: Panel::Teams,
            help_overlay: false,
            logs: VecDeque::with_capacity(MAX_LOG_LINES),
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.teams.get(self.teams_selected)
    }

    pub fn selected_match(&self) -> Option<&UpcomingMatch> {
        self.matches.get(self.matches_selected)
    }

    pub fn loading(&self, resource: Resource) -> bool {
        match resource {
            Resource::Teams => self.teams_loading,
            Resource::Matches => self.matches_loading,
            Resource::Predictions => self.predictions_loading,
        }
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Panel::Teams => {
                if !self.teams.is_empty() {
                    self.teams_selected = (self.teams_selected + 1).min(self.teams.len() - 1);
                }
            }
            Panel::Matches => {
                if !self.matches.is_empty() {
                    self.matches_selected =
                        (self.matches_selected + 1).min(self.matches.len() - 1);
                }
            }
            Panel::Predictions => {
                self.predictions_scroll = self.predictions_scroll.saturating_add(1);
            }
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Panel::Teams => self.teams_selected = self.teams_selected.saturating_sub(1),
            Panel::Matches => self.matches_selected = self.matches_selected.saturating_sub(1),
            Panel::Predictions => {
                self.predictions_scroll = self.predictions_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Panel::Teams => Panel::Matches,
            Panel::Matches => Panel::Predictions,
            Panel::Predictions => Panel::Selector,
            Panel::Selector => Panel::Chat,
            Panel::Chat => Panel::Teams,
        };
    }
}
