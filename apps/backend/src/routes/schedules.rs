//! Card schedule and due card endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use study_core::ReviewScheduler;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// PUT /api/schedules/:card_id
/// Seeds a card, or saves a schedule the client holds (e.g. after a failed save)
pub async fn upsert(
    State(state): State<AppState>,
    Path(card_id): Path<CardId>,
    Json(payload): Json<UpsertScheduleRequest>,
) -> Result<Json<ScheduleResponse>> {
    if payload.deck_id.trim().is_empty() {
        return Err(ApiError::BadRequest("deck_id must not be empty".to_string()));
    }

    let schedule = match payload.schedule {
        Some(schedule) if schedule.card_id != card_id => {
            return Err(ApiError::BadRequest(format!(
                "schedule is for card {}, not {}",
                schedule.card_id, card_id
            )));
        }
        Some(schedule) => schedule,
        None => match state.store.get(card_id).await? {
            Some(stored) => stored.schedule,
            None => state.engine.scheduler().initial_schedule(card_id),
        },
    };

    let saved = state.store.upsert(&payload.deck_id, &schedule).await?;

    Ok(Json(ScheduleResponse {
        deck_id: payload.deck_id,
        schedule: saved,
    }))
}

/// GET /api/schedules/:card_id
pub async fn get(
    State(state): State<AppState>,
    Path(card_id): Path<CardId>,
) -> Result<Json<ScheduleResponse>> {
    let stored = state
        .store
        .get(card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Card {} has no schedule", card_id)))?;

    Ok(Json(ScheduleResponse {
        deck_id: stored.deck_id,
        schedule: stored.schedule,
    }))
}

/// DELETE /api/schedules/:card_id
pub async fn delete(
    State(state): State<AppState>,
    Path(card_id): Path<CardId>,
) -> Result<StatusCode> {
    if state.store.delete(card_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Card {} has no schedule", card_id)))
    }
}

/// GET /api/decks/:deck_id/due
pub async fn due(
    State(state): State<AppState>,
    Path(deck_id): Path<DeckId>,
) -> Result<Json<DueCardsResponse>> {
    let schedules = state.store.deck_schedules(&deck_id).await?;
    let card_ids = state.engine.selector().select(&schedules, Utc::now());

    Ok(Json(DueCardsResponse { deck_id, card_ids }))
}
