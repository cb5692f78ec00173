//! Learner statistics endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::UserStats;
use crate::AppState;

/// GET /api/users/:user_id/stats
pub async fn stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStats>> {
    let session = state.sessions.session(&user_id).await?;

    let session_state = session.state().await;
    Ok(Json(session_state.store.stats(Utc::now())))
}
