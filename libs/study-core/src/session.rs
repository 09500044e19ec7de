//! Study session state.
//!
//! A session walks a fixed queue of cards. Status changes follow
//! [`SessionStatus::can_transition_to`]; counters only move through
//! [`StudySession::record_answer`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::types::{
    CardId, DeckId, Progress, Quality, SessionId, SessionSettings, SessionStatus, SessionSummary,
};

/// One study session over a queue of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: SessionId,
    pub deck_id: DeckId,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Cumulative milliseconds spent paused.
    pub paused_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<DateTime<Utc>>,
    pub queue: Vec<CardId>,
    pub total_cards: usize,
    pub completed_cards: usize,
    pub current_card_index: usize,
    pub correct_answers: usize,
    pub total_response_time_ms: u64,
    pub quality_scores: Vec<Quality>,
    pub settings: SessionSettings,
}

impl StudySession {
    pub(crate) fn new(
        id: SessionId,
        deck_id: DeckId,
        queue: Vec<CardId>,
        settings: SessionSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            deck_id,
            status: SessionStatus::Active,
            start_time: now,
            end_time: None,
            paused_time_ms: 0,
            paused_at: None,
            total_cards: queue.len(),
            queue,
            completed_cards: 0,
            current_card_index: 0,
            correct_answers: 0,
            total_response_time_ms: 0,
            quality_scores: Vec::new(),
            settings,
        }
    }

    /// Card waiting for an answer, if any.
    pub fn current_card(&self) -> Option<CardId> {
        self.queue.get(self.current_card_index).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.completed_cards >= self.total_cards
    }

    /// Ensure an answer can be recorded right now.
    pub(crate) fn check_answerable(&self) -> Result<CardId> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::InvalidState {
                status: self.status,
                action: "record an answer",
            });
        }
        if self.is_finished() {
            return Err(SessionError::QueueExhausted(self.id));
        }
        self.current_card()
            .ok_or(SessionError::QueueExhausted(self.id))
    }

    pub(crate) fn record_answer(&mut self, quality: Quality, response_time_ms: u64) -> Result<()> {
        self.check_answerable()?;
        self.completed_cards += 1;
        self.current_card_index += 1;
        self.quality_scores.push(quality);
        self.total_response_time_ms = self.total_response_time_ms.saturating_add(response_time_ms);
        if quality.is_correct() {
            self.correct_answers += 1;
        }
        Ok(())
    }

    /// Move to `next`, or fail leaving the session untouched.
    pub(crate) fn transition(
        &mut self,
        next: SessionStatus,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(SessionError::InvalidState {
                status: self.status,
                action,
            });
        }

        if let Some(paused_at) = self.paused_at.take() {
            let paused = (now - paused_at).num_milliseconds().max(0) as u64;
            self.paused_time_ms = self.paused_time_ms.saturating_add(paused);
        }
        match next {
            SessionStatus::Paused => self.paused_at = Some(now),
            SessionStatus::Completed | SessionStatus::Abandoned => self.end_time = Some(now),
            SessionStatus::Active => {}
        }
        self.status = next;
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        let percentage = if self.total_cards > 0 {
            (self.completed_cards as f64 / self.total_cards as f64 * 100.0).round() as u32
        } else {
            0
        };
        Progress {
            total_cards: self.total_cards,
            completed_cards: self.completed_cards,
            current_card_index: self.current_card_index,
            percentage,
            remaining_cards: self.total_cards.saturating_sub(self.completed_cards),
        }
    }

    /// Mean response time extrapolated over the cards still in the queue.
    pub fn estimated_time_remaining_ms(&self) -> u64 {
        if self.completed_cards == 0 || self.is_finished() {
            return 0;
        }
        let mean = self.total_response_time_ms as f64 / self.completed_cards as f64;
        let remaining = (self.total_cards - self.completed_cards) as f64;
        (mean * remaining).round() as u64
    }

    pub fn summary(&self) -> SessionSummary {
        let total_time_ms = match self.end_time {
            Some(end) => (end - self.start_time).num_milliseconds().max(0) as u64,
            None => 0,
        };

        let (average_quality, accuracy) = if self.quality_scores.is_empty() {
            (0.0, 0)
        } else {
            let answered = self.quality_scores.len() as f64;
            let sum: u32 = self.quality_scores.iter().map(|q| u32::from(q.ordinal())).sum();
            let average = (f64::from(sum) / answered * 10.0).round() / 10.0;
            let accuracy = (self.correct_answers as f64 / answered * 100.0).round() as u32;
            (average, accuracy)
        };

        SessionSummary {
            cards_studied: self.completed_cards,
            total_time_ms,
            active_time_ms: total_time_ms.saturating_sub(self.paused_time_ms),
            average_quality,
            correct_answers: self.correct_answers,
            accuracy,
            session_date: self.start_time,
        }
    }
}
