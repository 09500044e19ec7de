//! Spaced repetition scheduling core shared by study front ends.
//!
//! Provides:
//! - SM-2 review scheduling (`algorithm`)
//! - Due card selection with study-day resolution (`due`)
//! - Study session lifecycle, progress and statistics (`engine`, `session`)
//! - Shared types (CardSchedule, Quality, SessionStatus, etc.)
//!
//! Everything here is synchronous and free of I/O. Time is always passed in.

pub mod algorithm;
pub mod due;
pub mod engine;
pub mod error;
pub mod session;
pub mod types;

pub use algorithm::{ReviewScheduler, Sm2};
pub use due::{select_due, DueSelector};
pub use engine::{AnswerOutcome, SessionEngine};
pub use error::{Result, ScheduleError, SessionError};
pub use session::StudySession;
pub use types::{
    CardId, CardSchedule, DeckId, Progress, Quality, SessionId, SessionSettings, SessionStatus,
    SessionSummary,
};
