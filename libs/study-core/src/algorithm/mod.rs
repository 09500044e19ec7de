//! Spaced repetition scheduling.

pub mod sm2;

pub use sm2::Sm2;

use crate::error::ScheduleError;
use crate::types::{CardId, CardSchedule, Quality};
use chrono::{DateTime, Utc};

/// Trait for spaced repetition schedulers.
pub trait ReviewScheduler: Send + Sync {
    /// Scheduler identifier.
    fn name(&self) -> &'static str;

    /// Calculate the schedule that follows a review of `schedule` rated `quality`.
    ///
    /// Pure: the input is left untouched and the same inputs always produce the
    /// same output.
    fn calculate_next_review(
        &self,
        schedule: &CardSchedule,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<CardSchedule, ScheduleError>;

    /// Seed schedule for a card that has never been reviewed.
    fn initial_schedule(&self, card_id: CardId) -> CardSchedule;
}
