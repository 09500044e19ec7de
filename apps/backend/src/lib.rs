pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use study_core::SessionEngine;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::services::store::{MemoryStore, ScheduleStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SessionEngine>,
    pub store: Arc<dyn ScheduleStore>,
}

impl AppState {
    pub fn new(engine: SessionEngine, store: impl ScheduleStore + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            store: Arc::new(store),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Schedule routes
        .route(
            "/api/schedules/:card_id",
            put(routes::schedules::upsert)
                .get(routes::schedules::get)
                .delete(routes::schedules::delete),
        )
        .route("/api/decks/:deck_id/due", get(routes::schedules::due))
        // Session routes
        .route("/api/sessions", post(routes::sessions::create))
        .route(
            "/api/sessions/:id",
            get(routes::sessions::get).delete(routes::sessions::remove),
        )
        .route("/api/sessions/:id/progress", get(routes::sessions::progress))
        .route("/api/sessions/:id/estimate", get(routes::sessions::estimate))
        .route("/api/sessions/:id/summary", get(routes::sessions::summary))
        .route("/api/sessions/:id/answer", post(routes::sessions::answer))
        .route("/api/sessions/:id/pause", post(routes::sessions::pause))
        .route("/api/sessions/:id/resume", post(routes::sessions::resume))
        .route("/api/sessions/:id/complete", post(routes::sessions::complete))
        .route("/api/sessions/:id/abandon", post(routes::sessions::abandon))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Due selection: reset hour {}, limit {:?}",
        config.daily_reset_hour,
        config.reviews_per_day
    );

    let engine = SessionEngine::new(config.scheduler.clone(), config.selector());
    let state = AppState::new(engine, MemoryStore::new());

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
