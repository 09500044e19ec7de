//! Schedule persistence.
//!
//! The scheduling core never touches storage; handlers load schedules from a
//! [`ScheduleStore`] before answering and save the result afterwards.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use study_core::{CardId, CardSchedule, DeckId};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A card schedule together with the deck it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub deck_id: DeckId,
    pub schedule: CardSchedule,
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get(&self, card_id: CardId) -> Result<Option<StoredSchedule>, StoreError>;

    /// Insert or replace a schedule. Returns it with provenance timestamps set.
    async fn upsert(&self, deck_id: &str, schedule: &CardSchedule)
        -> Result<CardSchedule, StoreError>;

    /// Returns whether a schedule was removed.
    async fn delete(&self, card_id: CardId) -> Result<bool, StoreError>;

    /// Every schedule in a deck, ordered by card id.
    async fn deck_schedules(&self, deck_id: &str) -> Result<Vec<CardSchedule>, StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<CardId, StoredSchedule>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get(&self, card_id: CardId) -> Result<Option<StoredSchedule>, StoreError> {
        Ok(self.records.read().await.get(&card_id).cloned())
    }

    async fn upsert(
        &self,
        deck_id: &str,
        schedule: &CardSchedule,
    ) -> Result<CardSchedule, StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let created_at = records
            .get(&schedule.card_id)
            .and_then(|r| r.schedule.created_at)
            .or(schedule.created_at)
            .unwrap_or(now);

        let saved = CardSchedule {
            created_at: Some(created_at),
            updated_at: Some(now),
            ..schedule.clone()
        };
        records.insert(
            schedule.card_id,
            StoredSchedule {
                deck_id: deck_id.to_string(),
                schedule: saved.clone(),
            },
        );
        Ok(saved)
    }

    async fn delete(&self, card_id: CardId) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(&card_id).is_some())
    }

    async fn deck_schedules(&self, deck_id: &str) -> Result<Vec<CardSchedule>, StoreError> {
        let records = self.records.read().await;
        let mut schedules: Vec<CardSchedule> = records
            .values()
            .filter(|r| r.deck_id == deck_id)
            .map(|r| r.schedule.clone())
            .collect();
        schedules.sort_by_key(|s| s.card_id);
        Ok(schedules)
    }
}
