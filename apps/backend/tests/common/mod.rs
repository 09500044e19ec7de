//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up a test server over an in-memory store
//! - FlakyStore, a store whose writes can be made to fail
//! - Helpers for seeding cards and starting sessions

#![allow(dead_code)]

pub mod fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;

use study_backend::models::{CardId, CardSchedule, SessionResponse};
use study_backend::services::store::{MemoryStore, ScheduleStore, StoreError, StoredSchedule};
use study_backend::{router, AppState};
use study_core::{DueSelector, SessionEngine, Sm2};

/// In-memory store whose writes fail while `fail_writes` is set.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("write rejected".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ScheduleStore for FlakyStore {
    async fn get(&self, card_id: CardId) -> Result<Option<StoredSchedule>, StoreError> {
        self.inner.get(card_id).await
    }

    async fn upsert(
        &self,
        deck_id: &str,
        schedule: &CardSchedule,
    ) -> Result<CardSchedule, StoreError> {
        self.check()?;
        self.inner.upsert(deck_id, schedule).await
    }

    async fn delete(&self, card_id: CardId) -> Result<bool, StoreError> {
        self.check()?;
        self.inner.delete(card_id).await
    }

    async fn deck_schedules(&self, deck_id: &str) -> Result<Vec<CardSchedule>, StoreError> {
        self.inner.deck_schedules(deck_id).await
    }
}

/// Test context containing the store and a test server.
pub struct TestContext {
    pub store: Arc<FlakyStore>,
    pub server: TestServer,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_selector(DueSelector::default())
    }

    pub fn with_selector(selector: DueSelector) -> Self {
        let store = Arc::new(FlakyStore::default());
        let state = AppState {
            engine: Arc::new(SessionEngine::new(Sm2::default(), selector)),
            store: store.clone(),
        };
        let server = TestServer::new(router(state)).expect("Failed to start test server");

        Self { store, server }
    }

    /// Store a schedule directly, bypassing the API.
    pub async fn seed(&self, deck_id: &str, schedule: CardSchedule) {
        self.store
            .upsert(deck_id, &schedule)
            .await
            .expect("Failed to seed schedule");
    }

    /// Seed never-reviewed cards into a deck.
    pub async fn seed_new_cards(&self, deck_id: &str, card_ids: &[CardId]) {
        for &card_id in card_ids {
            self.seed(deck_id, CardSchedule::new(card_id)).await;
        }
    }

    /// Start a session through the API.
    pub async fn start_session(&self, deck_id: &str) -> SessionResponse {
        let response = self
            .server
            .post("/api/sessions")
            .json(&fixtures::create_session_request(deck_id))
            .await;
        response.assert_status_ok();
        response.json()
    }
}
