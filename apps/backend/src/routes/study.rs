//! Study endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::Result;
use crate::models::*;
use crate::services::session::now_ms;
use crate::AppState;

/// Queue size when the caller does not ask for one.
const DEFAULT_QUEUE_COUNT: usize = 3;

/// GET /api/users/:user_id/study/queue
pub async fn queue(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<StudyQueueQuery>,
) -> Result<Json<StudyQueueResponse>> {
    let session = state.sessions.session(&user_id).await?;

    let session_state = session.state().await;
    let words = session_state
        .store
        .select_for_review(query.count.unwrap_or(DEFAULT_QUEUE_COUNT), now_ms())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(StudyQueueResponse { words }))
}

/// POST /api/users/:user_id/study/answer
pub async fn answer(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let session = state.sessions.session(&user_id).await?;

    let outcome = {
        let mut session_state = session.state().await;
        session_state
            .store
            .record_answer(&payload.word, &payload.event(), now_ms())?
    };

    state.sessions.gateway().schedule_if_due(&session).await;

    Ok(Json(AnswerResponse {
        word: payload.word,
        outcome,
    }))
}
