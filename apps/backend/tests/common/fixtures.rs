//! Test fixtures and factory functions for creating test data.

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use study_backend::models::{CardId, CardSchedule};

/// Body for POST /api/sessions.
pub fn create_session_request(deck_id: &str) -> Value {
    json!({ "deck_id": deck_id })
}

/// Body for POST /api/sessions/:id/answer.
pub fn answer_request(quality: &str, response_time_ms: u64) -> Value {
    json!({
        "quality": quality,
        "response_time_ms": response_time_ms,
    })
}

/// A schedule that came due `days_ago` days ago.
pub fn overdue_schedule(card_id: CardId, days_ago: i64) -> CardSchedule {
    let now = Utc::now();
    CardSchedule {
        interval_days: Some(4.0),
        repetitions: 2,
        last_review_date: Some(now - Duration::days(days_ago + 4)),
        next_review_date: Some(now - Duration::days(days_ago)),
        ..CardSchedule::new(card_id)
    }
}

/// A schedule that is not due for another `days` days.
pub fn future_schedule(card_id: CardId, days: i64) -> CardSchedule {
    let now = Utc::now();
    CardSchedule {
        interval_days: Some(days as f64),
        repetitions: 3,
        last_review_date: Some(now),
        next_review_date: Some(now + Duration::days(days)),
        ..CardSchedule::new(card_id)
    }
}

/// A syntactically valid session id that no engine has issued.
pub fn unknown_session_id() -> &'static str {
    "01900000-0000-7000-8000-000000000000"
}
