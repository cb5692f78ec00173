//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring the real router over an in-memory state store
//! - Factory functions for request bodies and word content
//!
//! The in-memory context needs no external services, so these tests run
//! everywhere. Tests against PostgreSQL are marked
//! `#[ignore = "requires database"]` and read DATABASE_URL themselves.

pub mod fixtures;

use std::sync::Arc;

use axum::Router;

use vocabboost_backend::api_router;
use vocabboost_backend::db::MemoryStateStore;
use vocabboost_backend::services::content::StaticContentSource;
use vocabboost_backend::services::gateway::{FlushPolicy, PersistenceGateway};
use vocabboost_backend::services::session::SessionManager;

/// Test context containing the state store and the assembled router.
pub struct TestContext {
    pub store: Arc<MemoryStateStore>,
    pub sessions: Arc<SessionManager>,
    app: Router,
}

impl TestContext {
    /// Create a context with the default flush policy.
    pub fn new() -> Self {
        Self::with_policy(FlushPolicy::default())
    }

    /// Create a context with a custom flush policy, for exercising the
    /// background-flush path without waiting out the elapsed gate.
    pub fn with_policy(policy: FlushPolicy) -> Self {
        let store = Arc::new(MemoryStateStore::new());
        let content = Arc::new(StaticContentSource::new(fixtures::word_set()));
        let gateway = PersistenceGateway::new(store.clone(), policy);
        let sessions = Arc::new(SessionManager::new(content, store.clone(), gateway));
        let app = api_router(sessions.clone());

        Self {
            store,
            sessions,
            app,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}
