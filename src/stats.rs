//! Summary metrics derived from the loaded prediction set. Everything here is
//! a pure function of its inputs.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::state::Prediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

pub fn confidence_tier(confidence: f32) -> ConfidenceTier {
    if confidence >= 80.0 {
        ConfidenceTier::High
    } else if confidence >= 60.0 {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

pub fn tier_label(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => "HIGH",
        ConfidenceTier::Medium => "MED",
        ConfidenceTier::Low => "LOW",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionStats {
    pub total: usize,
    pub avg_confidence: f32,
}

pub fn summarize(predictions: &[Prediction]) -> PredictionStats {
    if predictions.is_empty() {
        return PredictionStats {
            total: 0,
            avg_confidence: 0.0,
        };
    }
    let sum: f32 = predictions.iter().map(|p| p.confidence).sum();
    let avg = sum / predictions.len() as f32;
    PredictionStats {
        total: predictions.len(),
        avg_confidence: (avg * 10.0).round() / 10.0,
    }
}

/// Human-relative age of a backend timestamp: minutes under an hour, hours
/// under a day, days beyond that. Future or unparseable timestamps render as
/// "0m ago" and "-" respectively.
pub fn relative_age(created_at: &str, now: DateTime<Utc>) -> String {
    let Some(created) = parse_timestamp(created_at) else {
        return "-".to_string();
    };
    let elapsed = now.signed_duration_since(created.and_utc());
    let minutes = elapsed.num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (24 * 60))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let cleaned = raw.trim().trim_end_matches('Z');
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    None
}
