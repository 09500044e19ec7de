//! Core types for the scheduling core.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Card identifier, owned by the external card store.
pub type CardId = i64;

/// Deck reference, opaque to the core.
pub type DeckId = String;

/// Quality rating for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    /// 4-point ordinal (1-4) used by the scheduling formula.
    pub(crate) fn ordinal(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Good and Easy count as correct answers.
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Good | Self::Easy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            other => Err(format!("unknown quality rating: {other}")),
        }
    }
}

/// Per-card scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSchedule {
    pub card_id: CardId,
    pub ease_factor: f64,
    /// Days until the next review. `None` until the card is first scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<f64>,
    pub repetitions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CardSchedule {
    /// Default seed for a card that has never been studied.
    pub fn new(card_id: CardId) -> Self {
        Self {
            card_id,
            ease_factor: 2.5,
            interval_days: None,
            repetitions: 0,
            next_review_date: None,
            last_review_date: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Study session identifier.
///
/// A UUIDv7: a millisecond timestamp followed by random bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn generate(now: DateTime<Utc>) -> Self {
        let seconds = now.timestamp().max(0) as u64;
        let ts = uuid::Timestamp::from_unix(uuid::NoContext, seconds, now.timestamp_subsec_nanos());
        Self(Uuid::new_v7(ts))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Completed and Abandoned sessions accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }

    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Active, Paused)
                | (Active, Completed)
                | (Active, Abandoned)
                | (Paused, Active)
                | (Paused, Abandoned)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session settings. Carried for the presentation layer; the engine does not
/// act on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub keyboard_shortcuts: bool,
    pub auto_advance: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            keyboard_shortcuts: true,
            auto_advance: true,
        }
    }
}

/// Progress through a session queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total_cards: usize,
    pub completed_cards: usize,
    pub current_card_index: usize,
    /// Whole percent, 0-100.
    pub percentage: u32,
    pub remaining_cards: usize,
}

/// End-of-session statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub cards_studied: usize,
    /// Milliseconds between start and end, 0 while the session is still open.
    pub total_time_ms: u64,
    /// `total_time_ms` minus time spent paused.
    pub active_time_ms: u64,
    /// Mean quality ordinal (1-4) rounded to one decimal, 0 with no answers.
    pub average_quality: f64,
    pub correct_answers: usize,
    /// Whole percent of correct answers, 0 with no answers.
    pub accuracy: u32,
    pub session_date: DateTime<Utc>,
}
