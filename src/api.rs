//! Typed wrappers over the prediction backend's HTTP surface. Each call is a
//! fresh request; errors carry context but are not interpreted here.

use std::env;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::http_client::http_client;
use crate::state::{Prediction, Team, UpcomingMatch, VectorStoreStatus};

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

pub fn api_base_url() -> String {
    env::var("API_BASE_URL")
        .ok()
        .map(|val| val.trim().trim_end_matches('/').to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn fetch_teams() -> Result<Vec<Team>> {
    let body = get_text(&format!("{}/predictions/teams", api_base_url()))?;
    parse_teams_json(&body)
}

pub fn fetch_upcoming_matches() -> Result<Vec<UpcomingMatch>> {
    let body = get_text(&format!("{}/predictions/upcoming-matches", api_base_url()))?;
    parse_matches_json(&body)
}

pub fn fetch_all_predictions() -> Result<Vec<Prediction>> {
    let body = get_text(&format!("{}/predictions/all", api_base_url()))?;
    parse_predictions_json(&body)
}

pub fn generate_prediction(match_id: u32) -> Result<Prediction> {
    let client = http_client()?;
    let url = format!("{}/predictions/generate/{match_id}", api_base_url());
    let body = client
        .post(&url)
        .send()
        .context("request failed")?
        .error_for_status()
        .context("backend rejected generate request")?
        .text()
        .context("failed to read response body")?;
    parse_prediction_json(&body)
}

pub fn predict_teams(home_team_id: u32, away_team_id: u32) -> Result<Prediction> {
    let client = http_client()?;
    let url = format!("{}/predictions/predict-teams", api_base_url());
    let body = client
        .post(&url)
        .json(&serde_json::json!({
            "homeTeamId": home_team_id,
            "awayTeamId": away_team_id,
        }))
        .send()
        .context("request failed")?
        .error_for_status()
        .context("backend rejected prediction request")?
        .text()
        .context("failed to read response body")?;
    parse_prediction_json(&body)
}

pub fn send_chat_message(message: &str) -> Result<String> {
    let client = http_client()?;
    let url = format!("{}/chat/message", api_base_url());
    let body = client
        .post(&url)
        .json(&serde_json::json!({ "message": message }))
        .send()
        .context("request failed")?
        .error_for_status()
        .context("backend rejected chat message")?
        .text()
        .context("failed to read response body")?;
    parse_chat_response_json(&body)
}

pub fn fetch_vector_status() -> Result<VectorStoreStatus> {
    let body = get_text(&format!("{}/chromadb/status", api_base_url()))?;
    serde_json::from_str(&body).context("invalid status json")
}

pub fn search_similar(query: &str, limit: usize) -> Result<Value> {
    let client = http_client()?;
    let url = format!("{}/chromadb/search", api_base_url());
    let body = client
        .get(&url)
        .query(&[("query", query), ("limit", &limit.to_string())])
        .send()
        .context("request failed")?
        .error_for_status()
        .context("search request rejected")?
        .text()
        .context("failed to read response body")?;
    serde_json::from_str(&body).context("invalid search json")
}

pub fn fetch_history(home_team: &str, away_team: &str) -> Result<String> {
    get_text(&format!(
        "{}/chromadb/history/{home_team}/{away_team}",
        api_base_url()
    ))
}

fn get_text(url: &str) -> Result<String> {
    let client = http_client()?;
    client
        .get(url)
        .send()
        .context("request failed")?
        .error_for_status()
        .context("backend returned error status")?
        .text()
        .context("failed to read response body")
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>> {
    parse_list(raw, "invalid teams json")
}

pub fn parse_matches_json(raw: &str) -> Result<Vec<UpcomingMatch>> {
    parse_list(raw, "invalid matches json")
}

pub fn parse_predictions_json(raw: &str) -> Result<Vec<Prediction>> {
    parse_list(raw, "invalid predictions json")
}

pub fn parse_prediction_json(raw: &str) -> Result<Prediction> {
    serde_json::from_str(raw.trim()).context("invalid prediction json")
}

pub fn parse_chat_response_json(raw: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct ChatResponse {
        response: String,
    }

    let parsed: ChatResponse = serde_json::from_str(raw.trim()).context("invalid chat json")?;
    Ok(parsed.response)
}

fn parse_list<T: for<'de> Deserialize<'de>>(raw: &str, label: &'static str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context(label)
}
