//! Dashboard orchestration: the three resource load cycles, the chat session
//! state machine, and the manual two-team prediction workflow. All state
//! changes happen here on the UI thread; network work is requested through
//! `ProviderCommand` and comes back as `Delta`s.

use std::sync::mpsc::Sender;

use crate::state::{
    AppState, ChatMessage, Delta, ProviderCommand, Resource, CHAT_ERROR_REPLY,
};

/// Keywords that earn an assistant reply the decorative football prefix.
const REPLY_KEYWORDS: [&str; 6] = ["prediction", "match", "goal", "win", "team", "league"];
const REPLY_PREFIX: &str = "[*] ";

pub struct Dashboard {
    pub state: AppState,
    cmd_tx: Sender<ProviderCommand>,
}

impl Dashboard {
    pub fn new(cmd_tx: Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            cmd_tx,
        }
    }

    /// Kicks off the initial load cycles. The three resources load
    /// concurrently with no ordering dependency between them.
    pub fn start(&mut self) {
        self.refresh(Resource::Teams);
        self.refresh(Resource::Matches);
        self.refresh(Resource::Predictions);
        let _ = self.cmd_tx.send(ProviderCommand::FetchVectorStatus);
    }

    /// One load cycle: mark loading, clear the prior error, request the
    /// fetch. Callers that want de-duplication check `loading()` first; the
    /// protocol itself allows overlapping cycles and the displayed collection
    /// reflects whichever result is applied last.
    pub fn refresh(&mut self, resource: Resource) {
        let (loading, error, cmd) = match resource {
            Resource::Teams => (
                &mut self.state.teams_loading,
                &mut self.state.teams_error,
                ProviderCommand::FetchTeams,
            ),
            Resource::Matches => (
                &mut self.state.matches_loading,
                &mut self.state.matches_error,
                ProviderCommand::FetchMatches,
            ),
            Resource::Predictions => (
                &mut self.state.predictions_loading,
                &mut self.state.predictions_error,
                ProviderCommand::FetchPredictions,
            ),
        };
        *loading = true;
        *error = None;
        if self.cmd_tx.send(cmd).is_err() {
            self.fail(resource, "provider unavailable".to_string());
        }
    }

    /// Chat submit transition. No-op on blank input or while a reply is
    /// outstanding, so requests never overlap and replies never interleave.
    pub fn submit_chat(&mut self) {
        if self.state.chat_waiting {
            return;
        }
        let message = self.state.chat_input.trim().to_string();
        if message.is_empty() {
            return;
        }

        self.state.chat_messages.push(ChatMessage::user(message.as_str()));
        self.state.chat_input.clear();
        self.state.chat_waiting = true;
        self.state.chat_stick_to_bottom = true;

        if self.cmd_tx.send(ProviderCommand::SendChat { message }).is_err() {
            self.append_chat_failure();
        }
    }

    /// Manual prediction entry point. Validation failures never reach the
    /// network layer.
    pub fn predict_manual(&mut self) {
        let (Some(team1), Some(team2)) = (
            self.state.selected_team1.clone(),
            self.state.selected_team2.clone(),
        ) else {
            self.state.push_log("[WARN] Please select two different teams");
            return;
        };
        if team1.id == team2.id {
            self.state.push_log("[WARN] Please select two different teams");
            return;
        }

        self.state.predicting = true;
        self.state.manual_prediction = None;
        let cmd = ProviderCommand::PredictTeams {
            home_team_id: team1.id,
            away_team_id: team2.id,
        };
        if self.cmd_tx.send(cmd).is_err() {
            self.state.predicting = false;
            self.state.push_log("[WARN] Prediction request failed to send");
        }
    }

    /// Requests an AI prediction for an already-scheduled match. Shares the
    /// manual workflow's predicting flag and result slot.
    pub fn predict_selected_match(&mut self) {
        let Some(match_id) = self.state.selected_match().map(|m| m.id) else {
            self.state.push_log("[INFO] No match selected");
            return;
        };
        self.state.predicting = true;
        self.state.manual_prediction = None;
        if self
            .cmd_tx
            .send(ProviderCommand::GeneratePrediction { match_id })
            .is_err()
        {
            self.state.predicting = false;
            self.state.push_log("[WARN] Prediction request failed to send");
        }
    }

    pub fn apply(&mut self, delta: Delta) {
        match delta {
            Delta::SetTeams(teams) => {
                self.state.teams = teams;
                self.state.teams_loading = false;
                self.state.teams_error = None;
                if !self.state.teams.is_empty() {
                    self.state.teams_selected =
                        self.state.teams_selected.min(self.state.teams.len() - 1);
                }
            }
            Delta::TeamsFailed(message) => self.fail(Resource::Teams, message),
            Delta::SetMatches(matches) => {
                self.state.matches = matches;
                self.state.matches_loading = false;
                self.state.matches_error = None;
                if !self.state.matches.is_empty() {
                    self.state.matches_selected =
                        self.state.matches_selected.min(self.state.matches.len() - 1);
                }
            }
            Delta::MatchesFailed(message) => self.fail(Resource::Matches, message),
            Delta::SetPredictions(predictions) => {
                self.state.predictions = predictions;
                self.state.predictions_loading = false;
                self.state.predictions_error = None;
            }
            Delta::PredictionsFailed(message) => self.fail(Resource::Predictions, message),
            Delta::ChatReply(text) => {
                self.state
                    .chat_messages
                    .push(ChatMessage::assistant(format_reply(&text)));
                self.state.chat_waiting = false;
                self.state.chat_stick_to_bottom = true;
            }
            Delta::ChatFailed(message) => {
                self.state.push_log(format!("[WARN] Chat error: {message}"));
                self.append_chat_failure();
            }
            Delta::ManualPredictionReady(prediction) => {
                self.state.manual_prediction = Some(prediction);
                self.state.predicting = false;
                self.state.push_log("[INFO] Prediction generated");
                // The new prediction should show up in history right away.
                self.refresh(Resource::Predictions);
            }
            Delta::ManualPredictionFailed(message) => {
                self.state.predicting = false;
                self.state.push_log(format!(
                    "[WARN] Prediction failed: {message} (is the inference backend running?)"
                ));
            }
            Delta::SetVectorStatus(status) => {
                self.state.vector_status = Some(status);
            }
            Delta::Log(line) => self.state.push_log(line),
        }
    }

    /// Failed load: keep whatever was displayed before, surface the message.
    fn fail(&mut self, resource: Resource, message: String) {
        let (loading, error, label) = match resource {
            Resource::Teams => (
                &mut self.state.teams_loading,
                &mut self.state.teams_error,
                "teams",
            ),
            Resource::Matches => (
                &mut self.state.matches_loading,
                &mut self.state.matches_error,
                "matches",
            ),
            Resource::Predictions => (
                &mut self.state.predictions_loading,
                &mut self.state.predictions_error,
                "predictions",
            ),
        };
        *loading = false;
        *error = Some(message.clone());
        self.state
            .push_log(format!("[WARN] Failed to load {label}: {message}"));
    }

    fn append_chat_failure(&mut self) {
        self.state
            .chat_messages
            .push(ChatMessage::assistant(CHAT_ERROR_REPLY));
        self.state.chat_waiting = false;
        self.state.chat_stick_to_bottom = true;
    }
}

/// Cosmetic only: football-sounding replies get a marker prefix.
pub fn format_reply(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if REPLY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        format!("{REPLY_PREFIX}{raw}")
    } else {
        raw.to_string()
    }
}
