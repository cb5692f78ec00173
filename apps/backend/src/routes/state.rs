//! Persisted-state export and import endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::services::session::now_ms;
use crate::AppState;

/// GET /api/users/:user_id/state
///
/// Exports the durable-document form of every word with history, so a
/// client can seed another device without waiting for a flush.
pub async fn export(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StateResponse>> {
    let session = state.sessions.session(&user_id).await?;

    let session_state = session.state().await;
    let now = now_ms();
    let states: Vec<PersistedWordState> = session_state
        .store
        .words()
        .iter()
        .filter(|record| !record.state.is_unseen() || record.state.bookmarked)
        .filter_map(|record| session_state.store.persisted_state(record.key(), now))
        .collect();

    Ok(Json(StateResponse { user_id, states }))
}

/// POST /api/users/:user_id/state/import
///
/// Merges externally produced state documents into the live session.
/// Unknown words are skipped, applied words are queued for the next
/// flush so the merge becomes durable.
pub async fn import(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ImportStateRequest>,
) -> Result<Json<MergeReport>> {
    let session = state.sessions.session(&user_id).await?;

    let report = {
        let mut session_state = session.state().await;
        let report = session_state
            .store
            .merge_persisted(&payload.states, now_ms());
        for doc in &payload.states {
            session_state.store.mark_pending(&doc.word);
        }
        report
    };

    state.sessions.gateway().schedule_if_due(&session).await;

    Ok(Json(report))
}
