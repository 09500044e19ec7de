//! API request and response types

use serde::{Deserialize, Serialize};

// Re-export shared types from study-core
pub use study_core::{
    AnswerOutcome, CardId, CardSchedule, DeckId, Progress, Quality, SessionId, SessionSettings,
    SessionStatus, SessionSummary, StudySession,
};

/// POST /api/sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub deck_id: DeckId,
    #[serde(default)]
    pub settings: SessionSettings,
}

/// A session snapshot with its derived progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: StudySession,
    pub progress: Progress,
    pub current_card: Option<CardId>,
}

impl From<StudySession> for SessionResponse {
    fn from(session: StudySession) -> Self {
        Self {
            progress: session.progress(),
            current_card: session.current_card(),
            session,
        }
    }
}

/// POST /api/sessions/:id/answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub quality: Quality,
    #[serde(default)]
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub card_id: CardId,
    pub schedule: CardSchedule,
    pub progress: Progress,
    pub finished: bool,
    pub next_card: Option<CardId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub remaining_ms: u64,
}

/// PUT /api/schedules/:card_id
///
/// Without `schedule` the stored one is kept, or a fresh one is seeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertScheduleRequest {
    pub deck_id: DeckId,
    #[serde(default)]
    pub schedule: Option<CardSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub deck_id: DeckId,
    pub schedule: CardSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueCardsResponse {
    pub deck_id: DeckId,
    pub card_ids: Vec<CardId>,
}
