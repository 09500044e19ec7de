//! Session engine.
//!
//! Owns every live [`StudySession`], addressed by [`SessionId`]. Each mutation
//! runs as one read-modify-write under the write lock, and callers only ever
//! get copies of session data back.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::{ReviewScheduler, Sm2};
use crate::due::DueSelector;
use crate::error::{Result, SessionError};
use crate::session::StudySession;
use crate::types::{
    CardId, CardSchedule, DeckId, Progress, Quality, SessionId, SessionSettings, SessionStatus,
    SessionSummary,
};

/// Result of answering the current card of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub card_id: CardId,
    /// Schedule to hand to the store. The session has already counted the
    /// answer whether or not saving it succeeds.
    pub schedule: CardSchedule,
    pub progress: Progress,
    /// True once every card in the queue has been answered.
    pub finished: bool,
}

/// Drives study sessions and applies the scheduler to their answers.
pub struct SessionEngine<A = Sm2> {
    scheduler: A,
    selector: DueSelector,
    sessions: RwLock<HashMap<SessionId, StudySession>>,
}

impl Default for SessionEngine<Sm2> {
    fn default() -> Self {
        Self::new(Sm2::default(), DueSelector::default())
    }
}

impl<A: ReviewScheduler> SessionEngine<A> {
    pub fn new(scheduler: A, selector: DueSelector) -> Self {
        Self {
            scheduler,
            selector,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn scheduler(&self) -> &A {
        &self.scheduler
    }

    pub fn selector(&self) -> &DueSelector {
        &self.selector
    }

    /// Start an `Active` session over `queue`.
    pub fn create_session(
        &self,
        deck_id: impl Into<DeckId>,
        queue: Vec<CardId>,
        settings: SessionSettings,
        now: DateTime<Utc>,
    ) -> SessionId {
        let id = SessionId::generate(now);
        let session = StudySession::new(id, deck_id.into(), queue, settings, now);
        tracing::debug!(
            session_id = %id,
            deck_id = %session.deck_id,
            total_cards = session.total_cards,
            "created study session"
        );
        self.write_sessions().insert(id, session);
        id
    }

    /// Start a session over whichever of `schedules` are due at `now`.
    pub fn start_due_session(
        &self,
        deck_id: impl Into<DeckId>,
        schedules: &[CardSchedule],
        settings: SessionSettings,
        now: DateTime<Utc>,
    ) -> SessionId {
        let queue = self.selector.select(schedules, now);
        self.create_session(deck_id, queue, settings, now)
    }

    /// Snapshot of a session.
    pub fn session(&self, id: SessionId) -> Result<StudySession> {
        self.read(id, StudySession::clone)
    }

    pub fn session_count(&self) -> usize {
        self.read_sessions().len()
    }

    /// Card waiting for an answer.
    pub fn current_card(&self, id: SessionId) -> Result<CardId> {
        self.read(id, |s| s.current_card().ok_or(SessionError::QueueExhausted(id)))?
    }

    pub fn get_progress(&self, id: SessionId) -> Result<Progress> {
        self.read(id, StudySession::progress)
    }

    /// Milliseconds the rest of the queue should take at the current pace.
    pub fn get_estimated_time_remaining(&self, id: SessionId) -> Result<u64> {
        self.read(id, StudySession::estimated_time_remaining_ms)
    }

    pub fn get_session_summary(&self, id: SessionId) -> Result<SessionSummary> {
        self.read(id, StudySession::summary)
    }

    /// Count an answer for the current card without scheduling it.
    pub fn record_answer(
        &self,
        id: SessionId,
        quality: Quality,
        response_time_ms: u64,
    ) -> Result<Progress> {
        self.write(id, |session| {
            session.record_answer(quality, response_time_ms)?;
            Ok(session.progress())
        })
    }

    /// Schedule `schedule` for `quality` and count the answer.
    ///
    /// Nothing changes when `schedule` is not the current card or cannot be
    /// scheduled.
    pub fn answer_card(
        &self,
        id: SessionId,
        schedule: &CardSchedule,
        quality: Quality,
        response_time_ms: u64,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        self.write(id, |session| {
            let expected = session.check_answerable()?;
            if schedule.card_id != expected {
                return Err(SessionError::UnexpectedCard {
                    expected,
                    answered: schedule.card_id,
                });
            }

            let next = self
                .scheduler
                .calculate_next_review(schedule, quality, now)?;
            session.record_answer(quality, response_time_ms)?;

            tracing::debug!(
                session_id = %id,
                card_id = expected,
                quality = quality.as_str(),
                interval_days = ?next.interval_days,
                "recorded answer"
            );

            Ok(AnswerOutcome {
                card_id: expected,
                schedule: next,
                progress: session.progress(),
                finished: session.is_finished(),
            })
        })
    }

    pub fn pause_session(&self, id: SessionId, now: DateTime<Utc>) -> Result<()> {
        self.transition(id, SessionStatus::Paused, "pause", now)
    }

    pub fn resume_session(&self, id: SessionId, now: DateTime<Utc>) -> Result<()> {
        self.transition(id, SessionStatus::Active, "resume", now)
    }

    pub fn complete_session(&self, id: SessionId, now: DateTime<Utc>) -> Result<()> {
        self.transition(id, SessionStatus::Completed, "complete", now)
    }

    pub fn abandon_session(&self, id: SessionId, now: DateTime<Utc>) -> Result<()> {
        self.transition(id, SessionStatus::Abandoned, "abandon", now)
    }

    /// Drop a session from the engine, returning its final state.
    pub fn remove_session(&self, id: SessionId) -> Result<StudySession> {
        self.write_sessions()
            .remove(&id)
            .ok_or(SessionError::NotFound(id))
    }

    fn transition(
        &self,
        id: SessionId,
        next: SessionStatus,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.write(id, |session| {
            let from = session.status;
            if let Err(error) = session.transition(next, action, now) {
                tracing::warn!(session_id = %id, %from, %next, "rejected session transition");
                return Err(error);
            }
            tracing::debug!(session_id = %id, %from, %next, "session transition");
            Ok(())
        })
    }

    fn read<T>(&self, id: SessionId, f: impl FnOnce(&StudySession) -> T) -> Result<T> {
        self.read_sessions()
            .get(&id)
            .map(f)
            .ok_or(SessionError::NotFound(id))
    }

    fn write<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut StudySession) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.write_sessions();
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        f(session)
    }

    // Sessions are plain data validated before every write, so a panic in
    // another thread cannot leave one half-updated.
    fn read_sessions(&self) -> RwLockReadGuard<'_, HashMap<SessionId, StudySession>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, StudySession>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
