//! Word list and bookmark endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// GET /api/users/:user_id/words
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WordListResponse>> {
    let session = state.sessions.session(&user_id).await?;

    let session_state = session.state().await;
    let words: Vec<WordRecord> = session_state.store.words().to_vec();
    let total = words.len();

    Ok(Json(WordListResponse { words, total }))
}

/// GET /api/users/:user_id/words/saved
pub async fn saved(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WordListResponse>> {
    let session = state.sessions.session(&user_id).await?;

    let session_state = session.state().await;
    let words: Vec<WordRecord> = session_state
        .store
        .saved_words()
        .into_iter()
        .cloned()
        .collect();
    let total = words.len();

    Ok(Json(WordListResponse { words, total }))
}

/// POST /api/users/:user_id/words/:word/bookmark
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    Path((user_id, word)): Path<(String, String)>,
) -> Result<Json<BookmarkResponse>> {
    let session = state.sessions.session(&user_id).await?;

    let bookmarked = {
        let mut session_state = session.state().await;
        session_state
            .store
            .toggle_bookmark(&word)
            .ok_or_else(|| ApiError::NotFound(format!("word '{word}'")))?
    };

    state.sessions.gateway().schedule_if_due(&session).await;

    Ok(Json(BookmarkResponse { word, bookmarked }))
}
