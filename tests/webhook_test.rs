//! Integration tests for the webhook HTTP surface.
//!
//! These drive the real axum router and the real dispatcher tree through
//! `tower::ServiceExt::oneshot`, with a throwaway on-disk database. Silent
//! lanes (unregistered senders, unclaimed updates) resolve without any
//! outbound Telegram call and assert on the HTTP status; the admin and
//! registration lanes attempt a send that fails against the test token, so
//! those tests assert on the session-store and database side effects that
//! the dispatch must have committed before the send.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use teloxide::types::Me;
use teloxide::Bot;
use tempfile::TempDir;
use tower::ServiceExt;

use videohub_bot::telegram::dialog::{AddVideoStage, Flow, FlowKind};
use videohub_bot::telegram::webhook::{create_webhook_router, spawn_update_worker, WebhookState};
use videohub_bot::telegram::{schema, HandlerDeps, SessionStore};
use videohub_bot::{create_pool, get_connection, DbPool};

use videohub_bot::storage::db;

fn test_pool() -> (TempDir, Arc<DbPool>) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("test.sqlite");
    let pool = create_pool(path.to_str().expect("non-utf8 temp path")).expect("failed to create pool");
    (dir, Arc::new(pool))
}

/// The bot's own `getMe` profile; command parsing resolves `/cmd@botname`
/// mentions against its username.
fn test_me() -> Me {
    serde_json::from_value(serde_json::json!({
        "id": 1234567890_i64,
        "is_bot": true,
        "first_name": "VideoHub",
        "username": "videohub_test_bot",
        "can_join_groups": false,
        "can_read_all_group_messages": false,
        "supports_inline_queries": false,
        "has_main_web_app": false
    }))
    .expect("failed to build bot profile")
}

fn test_app(pool: Arc<DbPool>, sessions: Arc<SessionStore>) -> axum::Router {
    let deps = HandlerDeps::new(pool, sessions);
    let bot = Bot::new("1234567890:TEST_TOKEN_NOT_A_REAL_ONE_________");
    let queue = spawn_update_worker(bot, test_me(), schema(deps));
    create_webhook_router(WebhookState::new(queue))
}

fn post_webhook(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn text_update(update_id: u32, from_id: i64, text: &str) -> String {
    serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": 10,
            "date": 1700000000,
            "chat": {"id": from_id, "type": "private", "first_name": "Test"},
            "from": {"id": from_id, "is_bot": false, "first_name": "Test"},
            "text": text
        }
    })
    .to_string()
}

fn callback_update(update_id: u32, from_id: i64, data: &str) -> String {
    serde_json::json!({
        "update_id": update_id,
        "callback_query": {
            "id": "cbq-1",
            "from": {"id": from_id, "is_bot": false, "first_name": "Test"},
            "message": {
                "message_id": 70,
                "date": 1700000000,
                "chat": {"id": from_id, "type": "private", "first_name": "Test"}
            },
            "chat_instance": "ci-1",
            "data": data
        }
    })
    .to_string()
}

/// A plain-text message from a user who never registered: the router routes
/// it to the video-selection lane, which stays silent, and the request is an
/// accepted no-op.
#[tokio::test]
async fn test_unregistered_text_message_returns_ok() {
    let (_dir, pool) = test_pool();
    let app = test_app(pool, Arc::new(SessionStore::new()));

    let response = app
        .oneshot(post_webhook(&text_update(1, 42, "Some Title")))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.expect("body read failed").to_bytes();
    assert!(body.is_empty());
}

/// An update no handler claims (unknown command) is still a success. The
/// unknown command still runs through command parsing, which must not take
/// the worker down.
#[tokio::test]
async fn test_unclaimed_update_returns_ok() {
    let (_dir, pool) = test_pool();
    let app = test_app(pool, Arc::new(SessionStore::new()));

    let response = app
        .oneshot(post_webhook(&text_update(2, 42, "/bogus")))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

/// The worker survives a command update and keeps serving: two sequential
/// requests through the same queue both complete.
#[tokio::test]
async fn test_worker_survives_command_updates() {
    let (_dir, pool) = test_pool();
    let app = test_app(pool, Arc::new(SessionStore::new()));

    let first = app
        .clone()
        .oneshot(post_webhook(&text_update(3, 42, "/bogus")))
        .await
        .expect("request failed");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(post_webhook(&text_update(4, 42, "Some Title")))
        .await
        .expect("request failed");
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_update_returns_server_error() {
    let (_dir, pool) = test_pool();
    let app = test_app(pool, Arc::new(SessionStore::new()));

    let response = app
        .oneshot(post_webhook("this is not json"))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// "Add Video" from a sender who is not in the admins table must not open
/// an add-video session, before and regardless of the denial message send.
#[tokio::test]
async fn test_non_admin_add_video_opens_no_session() {
    let (_dir, pool) = test_pool();
    let sessions = Arc::new(SessionStore::new());
    let app = test_app(Arc::clone(&pool), Arc::clone(&sessions));

    let _ = app
        .oneshot(post_webhook(&text_update(5, 42, "Add Video")))
        .await
        .expect("request failed");

    assert!(sessions.is_empty());
}

/// "Add Video" from a seeded admin opens the add-video flow at the title
/// stage before any reply goes out.
#[tokio::test]
async fn test_admin_add_video_opens_title_stage() {
    let (_dir, pool) = test_pool();
    {
        let conn = get_connection(&pool).expect("pool exhausted");
        db::add_admin(&conn, 42).expect("failed to seed admin");
    }
    let sessions = Arc::new(SessionStore::new());
    let app = test_app(Arc::clone(&pool), Arc::clone(&sessions));

    let _ = app
        .oneshot(post_webhook(&text_update(6, 42, "Add Video")))
        .await
        .expect("request failed");

    assert_eq!(sessions.kind(42), Some(FlowKind::AddVideo));
}

/// /start from an unknown sender opens a registration session at the name
/// stage.
#[tokio::test]
async fn test_start_from_unknown_user_opens_registration() {
    let (_dir, pool) = test_pool();
    let sessions = Arc::new(SessionStore::new());
    let app = test_app(Arc::clone(&pool), Arc::clone(&sessions));

    let _ = app
        .oneshot(post_webhook(&text_update(7, 42, "/start")))
        .await
        .expect("request failed");

    assert_eq!(sessions.kind(42), Some(FlowKind::Registration));
}

/// /start from an already-registered sender resets any open dialog instead
/// of opening a new one.
#[tokio::test]
async fn test_start_from_registered_user_resets_open_dialog() {
    let (_dir, pool) = test_pool();
    {
        let conn = get_connection(&pool).expect("pool exhausted");
        db::create_user(&conn, 42, "Test User", "+15550001111").expect("failed to seed user");
    }
    let sessions = Arc::new(SessionStore::new());
    sessions.open(42, Flow::AddVideo(AddVideoStage::AwaitingTitle));
    let app = test_app(Arc::clone(&pool), Arc::clone(&sessions));

    let _ = app
        .oneshot(post_webhook(&text_update(8, 42, "/start")))
        .await
        .expect("request failed");

    assert!(sessions.is_empty());
}

/// A delete callback naming a telegram id with no row deletes nothing and
/// leaves the real users in place.
#[tokio::test]
async fn test_delete_callback_for_unknown_user_leaves_rows() {
    let (_dir, pool) = test_pool();
    {
        let conn = get_connection(&pool).expect("pool exhausted");
        db::add_admin(&conn, 42).expect("failed to seed admin");
        db::create_user(&conn, 77, "Kept User", "+15550002222").expect("failed to seed user");
    }
    let sessions = Arc::new(SessionStore::new());
    let app = test_app(Arc::clone(&pool), sessions);

    let _ = app
        .oneshot(post_webhook(&callback_update(9, 42, "delete_user_999999")))
        .await
        .expect("request failed");

    let conn = get_connection(&pool).expect("pool exhausted");
    let kept = db::get_user_by_telegram_id(&conn, 77).expect("lookup failed");
    assert!(kept.is_some());
}

/// A delete callback for an existing user removes the row even though the
/// follow-up confirmation edit cannot reach Telegram here.
#[tokio::test]
async fn test_delete_callback_removes_user_row() {
    let (_dir, pool) = test_pool();
    {
        let conn = get_connection(&pool).expect("pool exhausted");
        db::add_admin(&conn, 42).expect("failed to seed admin");
        db::create_user(&conn, 77, "Doomed User", "+15550003333").expect("failed to seed user");
    }
    let sessions = Arc::new(SessionStore::new());
    let app = test_app(Arc::clone(&pool), sessions);

    let _ = app
        .oneshot(post_webhook(&callback_update(10, 42, "delete_user_77")))
        .await
        .expect("request failed");

    let conn = get_connection(&pool).expect("pool exhausted");
    let gone = db::get_user_by_telegram_id(&conn, 77).expect("lookup failed");
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_index_reports_liveness() {
    let (_dir, pool) = test_pool();
    let app = test_app(pool, Arc::new(SessionStore::new()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.expect("body read failed").to_bytes();
    assert_eq!(&body[..], b"Telegram Bot is running!");
}

#[tokio::test]
async fn test_health_returns_json_status() {
    let (_dir, pool) = test_pool();
    let app = test_app(pool, Arc::new(SessionStore::new()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.expect("body read failed").to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).expect("invalid json body");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["bot"], "running");
}
