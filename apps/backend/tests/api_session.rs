//! Session lifecycle API tests: flush, refresh, and end.

mod common;

use axum_test::TestServer;
use chrono::Utc;

use vocabboost_backend::db::StateStore;
use vocabboost_backend::models::PersistedWordState;
use vocabboost_backend::services::gateway::FlushPolicy;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_flush_persists_pending_reviews() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");

    server
        .post(&format!("/api/users/{user}/study/answer"))
        .json(&fixtures::answer_request("ephemeral", true, 1_500))
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/users/{user}/study/answer"))
        .json(&fixtures::answer_request("laconic", false, 9_000))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/users/{user}/session/flush"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "flushed");
    assert_eq!(body["words"], 2);
    assert_eq!(ctx.store.count(&user).await, 2);
}

#[tokio::test]
async fn test_flush_with_nothing_pending_is_skipped() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");

    server
        .get(&format!("/api/users/{user}/words"))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/api/users/{user}/session/flush"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "skipped");
    assert_eq!(body["reason"], "nothing pending");
    assert_eq!(ctx.store.count(&user).await, 0);
}

#[tokio::test]
async fn test_session_end_flushes_and_second_end_is_skipped() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");

    server
        .post(&format!("/api/users/{user}/study/answer"))
        .json(&fixtures::answer_request("ubiquitous", true, 2_000))
        .await
        .assert_status_ok();

    let response = server.post(&format!("/api/users/{user}/session/end")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "flushed");
    assert_eq!(body["words"], 1);
    assert_eq!(ctx.store.count(&user).await, 1);

    let response = server.post(&format!("/api/users/{user}/session/end")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "skipped");
    assert_eq!(body["reason"], "no active session");
}

/// A session built after `end` starts from the persisted state.
#[tokio::test]
async fn test_session_rebuilds_from_store_after_end() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");

    server
        .post(&format!("/api/users/{user}/study/answer"))
        .json(&fixtures::answer_request("alacrity", true, 1_000))
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/users/{user}/session/end"))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/api/users/{user}/words")).await;
    let body: serde_json::Value = response.json();
    let word = body["words"]
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["content"]["word"] == "alacrity")
        .unwrap();

    assert_eq!(word["state"]["times_reviewed"], 1);
    assert_eq!(word["state"]["repetition_count"], 1);
}

/// Refresh folds in state another writer put in the store after the
/// session was built.
#[tokio::test]
async fn test_refresh_picks_up_external_writes() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");
    let now = Utc::now().timestamp_millis();

    server
        .get(&format!("/api/users/{user}/words"))
        .await
        .assert_status_ok();

    let doc = PersistedWordState {
        word: "laconic".to_string(),
        ease_factor: None,
        interval: None,
        repetition_count: None,
        last_reviewed: Some(now - fixtures::DAY_MS),
        next_review_date: None,
        times_reviewed: Some(6),
        times_correct: Some(4),
        is_bookmarked: None,
        updated_at: Some(now),
    };
    ctx.store.upsert_word_states(&user, &[doc]).await.unwrap();

    let response = server
        .post(&format!("/api/users/{user}/session/refresh"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], user.as_str());
    assert_eq!(body["applied"], 1);
    assert_eq!(body["skipped"], 0);

    let response = server.get(&format!("/api/users/{user}/words")).await;
    let body: serde_json::Value = response.json();
    let word = body["words"]
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["content"]["word"] == "laconic")
        .unwrap();
    assert_eq!(word["state"]["times_reviewed"], 6);
    assert_eq!(word["state"]["times_correct"], 4);
}

/// A failed flush keeps every pending review for the next attempt.
#[tokio::test]
async fn test_failed_flush_keeps_reviews_pending() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");

    server
        .post(&format!("/api/users/{user}/study/answer"))
        .json(&fixtures::answer_request("obdurate", true, 2_500))
        .await
        .assert_status_ok();

    ctx.store.fail_writes(true);
    let response = server
        .post(&format!("/api/users/{user}/session/flush"))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "failed");
    assert_eq!(ctx.store.count(&user).await, 0);

    ctx.store.fail_writes(false);
    let response = server
        .post(&format!("/api/users/{user}/session/flush"))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "flushed");
    assert_eq!(body["words"], 1);
    assert_eq!(ctx.store.count(&user).await, 1);
}

/// With the write-through policy satisfied, answering schedules a flush
/// on its own; the explicit flush afterwards finds nothing left.
#[tokio::test]
async fn test_answers_trigger_policy_flush() {
    let ctx = TestContext::with_policy(FlushPolicy {
        min_pending: 2,
        min_elapsed_ms: -1,
    });
    let server = TestServer::new(ctx.router()).unwrap();
    let user = fixtures::unique_user("sess");

    for word in ["ephemeral", "laconic"] {
        server
            .post(&format!("/api/users/{user}/study/answer"))
            .json(&fixtures::answer_request(word, true, 2_000))
            .await
            .assert_status_ok();
    }
    // Two pending does not clear the threshold.
    assert_eq!(ctx.store.count(&user).await, 0);

    server
        .post(&format!("/api/users/{user}/study/answer"))
        .json(&fixtures::answer_request("ubiquitous", true, 2_000))
        .await
        .assert_status_ok();

    // The worker runs jobs in order, so by the time the explicit flush
    // reports back the scheduled one has already drained the queue.
    let response = server
        .post(&format!("/api/users/{user}/session/flush"))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["type"], "skipped");
    assert_eq!(ctx.store.count(&user).await, 3);
}
