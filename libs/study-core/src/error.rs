//! Error types for study-core.

use thiserror::Error;

use crate::types::{CardId, SessionId, SessionStatus};

/// Result type alias using SessionError.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Scheduling contract violations. These are caller bugs, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("card {card_id} has {repetitions} repetitions but no interval")]
    MissingInterval { card_id: CardId, repetitions: u32 },

    #[error("card {card_id} has a non-finite {field}: {value}")]
    NonFinite {
        card_id: CardId,
        field: &'static str,
        value: f64,
    },

    #[error("card {card_id} cannot be scheduled {interval_days} days ahead")]
    DateOverflow { card_id: CardId, interval_days: f64 },
}

/// Errors raised by the session engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error("invalid session state: cannot {action} while session is {status}")]
    InvalidState {
        status: SessionStatus,
        action: &'static str,
    },

    #[error("session {0} has no cards left to answer")]
    QueueExhausted(SessionId),

    #[error("card {answered} is not the current card {expected}")]
    UnexpectedCard { expected: CardId, answered: CardId },

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
