//! Worker side of the dashboard: receives `ProviderCommand`s, calls the
//! backend through the gateway, and answers with `Delta`s. Each request runs
//! on its own thread so loads, chat, and predictions can be outstanding at
//! the same time.

use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;

use crate::api;
use crate::state::{Delta, Prediction, ProviderCommand};

pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let simulate_predictions = env::var("PREDICTIONS_SOURCE")
            .map(|val| val.trim().eq_ignore_ascii_case("simulated"))
            .unwrap_or(false);

        while let Ok(cmd) = cmd_rx.recv() {
            let tx = tx.clone();
            match cmd {
                ProviderCommand::FetchTeams => {
                    thread::spawn(move || {
                        let delta = match api::fetch_teams() {
                            Ok(teams) => Delta::SetTeams(teams),
                            Err(err) => Delta::TeamsFailed(err.to_string()),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::FetchMatches => {
                    thread::spawn(move || {
                        let delta = match api::fetch_upcoming_matches() {
                            Ok(matches) => Delta::SetMatches(matches),
                            Err(err) => Delta::MatchesFailed(err.to_string()),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::FetchPredictions => {
                    if simulate_predictions {
                        // No history endpoint configured: same delta, same
                        // shape, so the coordinator cannot tell.
                        let _ = tx.send(Delta::SetPredictions(simulated_predictions()));
                        continue;
                    }
                    thread::spawn(move || {
                        let delta = match api::fetch_all_predictions() {
                            Ok(predictions) => Delta::SetPredictions(predictions),
                            Err(err) => Delta::PredictionsFailed(err.to_string()),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::PredictTeams {
                    home_team_id,
                    away_team_id,
                } => {
                    thread::spawn(move || {
                        let delta = match api::predict_teams(home_team_id, away_team_id) {
                            Ok(prediction) => Delta::ManualPredictionReady(prediction),
                            Err(err) => Delta::ManualPredictionFailed(err.to_string()),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::GeneratePrediction { match_id } => {
                    thread::spawn(move || {
                        let delta = match api::generate_prediction(match_id) {
                            Ok(prediction) => Delta::ManualPredictionReady(prediction),
                            Err(err) => Delta::ManualPredictionFailed(err.to_string()),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::SendChat { message } => {
                    thread::spawn(move || {
                        let delta = match api::send_chat_message(&message) {
                            Ok(reply) => Delta::ChatReply(reply),
                            Err(err) => Delta::ChatFailed(err.to_string()),
                        };
                        let _ = tx.send(delta);
                    });
                }
                ProviderCommand::FetchVectorStatus => {
                    thread::spawn(move || {
                        match api::fetch_vector_status() {
                            Ok(status) => {
                                let _ = tx.send(Delta::SetVectorStatus(status));
                            }
                            Err(err) => {
                                let _ = tx
                                    .send(Delta::Log(format!("[WARN] Vector store status: {err}")));
                            }
                        };
                    });
                }
            }
        }
    });
}

const SIMULATED_FIXTURES: [(&str, &str, &str); 5] = [
    ("Real Madrid", "Barcelona", "La Liga"),
    ("Liverpool", "Chelsea", "Premier League"),
    ("Bayern Munich", "Borussia Dortmund", "Bundesliga"),
    ("Inter", "AC Milan", "Serie A"),
    ("PSG", "Marseille", "Ligue 1"),
];

pub fn simulated_predictions() -> Vec<Prediction> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    SIMULATED_FIXTURES
        .iter()
        .enumerate()
        .map(|(idx, (home, away, league))| {
            let created = now - ChronoDuration::minutes(rng.gen_range(5..2_880i64));
            Prediction {
                id: Some(idx as u32 + 1),
                home_team_id: idx as u32 * 2 + 1,
                away_team_id: idx as u32 * 2 + 2,
                home_team: Some((*home).to_string()),
                away_team: Some((*away).to_string()),
                predicted_home_score: rng.gen_range(0..4),
                predicted_away_score: rng.gen_range(0..3),
                confidence: rng.gen_range(45.0..95.0_f32),
                explanation: format!("{home} edge it on recent form and home advantage."),
                created_at: Some(created.format("%Y-%m-%dT%H:%M:%S").to_string()),
                league: Some((*league).to_string()),
            }
        })
        .collect()
}
