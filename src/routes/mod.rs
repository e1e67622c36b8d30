//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/lessons", get(http::http_list_lessons))
        .route("/api/v1/lesson", get(http::http_get_lesson))
        .route("/api/v1/hint", get(http::http_get_hint))
        .route("/api/v1/session", post(http::http_open_session))
        .route("/api/v1/submit", post(http::http_post_submit))
        .route("/api/v1/reset", post(http::http_post_reset))
        .route("/api/v1/lesson/select", post(http::http_post_select_lesson))
        .route("/api/v1/progress", get(http::http_get_progress))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::catalog::Catalog;
    use crate::config::Prompts;
    use crate::progress::MemoryProgressStore;

    fn test_router() -> Router {
        let state = Arc::new(AppState::assemble(
            Catalog::builtin(),
            Prompts::default(),
            None, // no advisor: failed submissions fall back to the static hint
            Box::new(MemoryProgressStore::new()),
        ));
        build_router(state)
    }

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let res = router.clone().oneshot(req).await.expect("response");
        let status = res.status();
        (status, json_body(res).await)
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).expect("request");
        let res = router.clone().oneshot(req).await.expect("response");
        let status = res.status();
        (status, json_body(res).await)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = test_router();
        let (status, body) = get(&router, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn unknown_lesson_id_is_not_found() {
        let router = test_router();
        let (status, _) = get(&router, "/api/v1/lesson?id=99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = get(&router, "/api/v1/lesson?id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["expectedOutput"], "Hello, World!");
    }

    #[tokio::test]
    async fn submit_flow_drives_streak_and_unlock() {
        let router = test_router();

        let (status, session) = post_json(&router, "/api/v1/session", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        let sid = session["sessionId"].as_str().expect("session id").to_string();
        assert_eq!(session["activeLessonId"], 1);

        // Correct solution for lesson 1.
        let (status, body) = post_json(
            &router,
            "/api/v1/submit",
            serde_json::json!({ "sessionId": sid, "code": "print('Hello, World!')" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"]["kind"], "success");
        assert_eq!(body["session"]["streak"], 1);
        assert_eq!(body["session"]["maxUnlockedLesson"], 2);

        // Lesson 3 is still locked, lesson 2 is selectable.
        let (status, _) = post_json(
            &router,
            "/api/v1/lesson/select",
            serde_json::json!({ "sessionId": sid, "lessonId": 3 }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = post_json(
            &router,
            "/api/v1/lesson/select",
            serde_json::json!({ "sessionId": sid, "lessonId": 2 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeLessonId"], 2);

        // Wrong answer: streak resets, verdict falls back to the static hint.
        let (status, body) = post_json(
            &router,
            "/api/v1/submit",
            serde_json::json!({ "sessionId": sid, "code": "print('nope')" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"]["kind"], "plain_error");
        assert_eq!(body["session"]["streak"], 0);
        assert!(body["verdict"]["explanation"].as_str().expect("hint").len() > 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let router = test_router();
        let (status, _) = post_json(
            &router,
            "/api/v1/submit",
            serde_json::json!({ "sessionId": "ghost", "code": "print(1)" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get(&router, "/api/v1/progress?sessionId=ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
