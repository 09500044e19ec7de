//! Study session endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use study_core::ReviewScheduler;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/sessions
/// Starts a session over the deck's due cards
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>> {
    if payload.deck_id.trim().is_empty() {
        return Err(ApiError::BadRequest("deck_id must not be empty".to_string()));
    }

    let schedules = state.store.deck_schedules(&payload.deck_id).await?;
    let id = state
        .engine
        .start_due_session(payload.deck_id, &schedules, payload.settings, Utc::now());

    tracing::info!("Started session {}", id);

    Ok(Json(state.engine.session(id)?.into()))
}

/// GET /api/sessions/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.engine.session(id)?.into()))
}

/// DELETE /api/sessions/:id
/// Drops the session and returns its final summary
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionSummary>> {
    let session = state.engine.remove_session(id)?;
    Ok(Json(session.summary()))
}

/// GET /api/sessions/:id/progress
pub async fn progress(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<Progress>> {
    Ok(Json(state.engine.get_progress(id)?))
}

/// GET /api/sessions/:id/estimate
pub async fn estimate(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<EstimateResponse>> {
    let remaining_ms = state.engine.get_estimated_time_remaining(id)?;
    Ok(Json(EstimateResponse { remaining_ms }))
}

/// GET /api/sessions/:id/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionSummary>> {
    Ok(Json(state.engine.get_session_summary(id)?))
}

/// POST /api/sessions/:id/answer
/// Schedules the current card and counts the answer
pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let card_id = state.engine.current_card(id)?;
    let deck_id = state.engine.session(id)?.deck_id;

    // Cards without a stored schedule start from the default seed
    let schedule = match state.store.get(card_id).await? {
        Some(stored) => stored.schedule,
        None => state.engine.scheduler().initial_schedule(card_id),
    };

    let outcome = state.engine.answer_card(
        id,
        &schedule,
        payload.quality,
        payload.response_time_ms,
        Utc::now(),
    )?;

    // The answer is already counted; a failed save is reported on its own
    let result = state.store.upsert(&deck_id, &outcome.schedule).await;
    let saved = match result {
        Ok(saved) => saved,
        Err(e) => {
            tracing::error!("Failed to save schedule for card {}: {}", card_id, e);
            return Err(ApiError::Persistence {
                card_id,
                schedule: Box::new(outcome.schedule),
                message: e.to_string(),
            });
        }
    };

    let next_card = state.engine.session(id)?.current_card();

    Ok(Json(AnswerResponse {
        card_id: outcome.card_id,
        schedule: saved,
        progress: outcome.progress,
        finished: outcome.finished,
        next_card,
    }))
}

/// POST /api/sessions/:id/pause
pub async fn pause(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>> {
    state.engine.pause_session(id, Utc::now())?;
    Ok(Json(state.engine.session(id)?.into()))
}

/// POST /api/sessions/:id/resume
pub async fn resume(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>> {
    state.engine.resume_session(id, Utc::now())?;
    Ok(Json(state.engine.session(id)?.into()))
}

/// POST /api/sessions/:id/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>> {
    state.engine.complete_session(id, Utc::now())?;
    tracing::info!("Completed session {}", id);
    Ok(Json(state.engine.session(id)?.into()))
}

/// POST /api/sessions/:id/abandon
pub async fn abandon(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>> {
    state.engine.abandon_session(id, Utc::now())?;
    tracing::info!("Abandoned session {}", id);
    Ok(Json(state.engine.session(id)?.into()))
}
