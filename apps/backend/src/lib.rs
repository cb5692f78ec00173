pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::{Database, MemoryStateStore, StateStore};
use crate::services::content::{ContentSource, JsonFileSource};
use crate::services::gateway::{FlushPolicy, PersistenceGateway};
use crate::services::session::SessionManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

/// Build the API router over the given session manager
pub fn api_router(sessions: Arc<SessionManager>) -> Router {
    let state = AppState { sessions };

    Router::new()
        .route("/health", get(health_check))
        // Study routes
        .route("/api/users/:user_id/study/queue", get(routes::study::queue))
        .route("/api/users/:user_id/study/answer", post(routes::study::answer))
        // Word routes
        .route("/api/users/:user_id/words", get(routes::words::list))
        .route("/api/users/:user_id/words/saved", get(routes::words::saved))
        .route(
            "/api/users/:user_id/words/:word/bookmark",
            post(routes::words::toggle_bookmark),
        )
        // Stats routes
        .route("/api/users/:user_id/stats", get(routes::stats::stats))
        // State routes
        .route("/api/users/:user_id/state", get(routes::state::export))
        .route("/api/users/:user_id/state/import", post(routes::state::import))
        // Session routes
        .route(
            "/api/users/:user_id/session/refresh",
            post(routes::session::refresh),
        )
        .route(
            "/api/users/:user_id/session/flush",
            post(routes::session::flush),
        )
        .route("/api/users/:user_id/session/end", post(routes::session::end))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
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

    let store: Arc<dyn StateStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(&database_url).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;

            Arc::new(db)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, keeping word states in memory only");
            Arc::new(MemoryStateStore::new())
        }
    };

    let words_file = std::env::var("WORDS_FILE").unwrap_or_else(|_| "data/words.json".to_string());
    tracing::info!("Serving word content from {}", words_file);
    let content: Arc<dyn ContentSource> = Arc::new(JsonFileSource::new(&words_file));

    let gateway = PersistenceGateway::new(store.clone(), FlushPolicy::default());
    let sessions = Arc::new(SessionManager::new(content, store, gateway));

    let app = api_router(sessions.clone());

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Flushing sessions before exit...");
    sessions.flush_all().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health_check() -> &'static str {
    "OK"
}
