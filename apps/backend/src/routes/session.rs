//! Session lifecycle endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::models::SessionRefreshResponse;
use crate::services::gateway::FlushOutcome;
use crate::AppState;

/// POST /api/users/:user_id/session/refresh
///
/// Pulls the persisted state again and merges it into the live session,
/// for clients resuming after running on another device.
pub async fn refresh(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SessionRefreshResponse>> {
    let merge = state.sessions.refresh(&user_id).await?;
    Ok(Json(SessionRefreshResponse { user_id, merge }))
}

/// POST /api/users/:user_id/session/flush
///
/// Flushes pending changes now, keeping the session alive. Used when the
/// client moves to the background but may come back.
pub async fn flush(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<FlushOutcome>> {
    let session = state.sessions.session(&user_id).await?;
    let outcome = state.sessions.gateway().flush_now(&session, false).await;
    Ok(Json(outcome))
}

/// POST /api/users/:user_id/session/end
///
/// Final flush and session teardown. The flush is forced: a failed write
/// is logged and the batch dropped, since nobody is left to retry.
pub async fn end(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<FlushOutcome> {
    Json(state.sessions.end(&user_id).await)
}
