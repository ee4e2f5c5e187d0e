//! HTTP API layer: route handlers and router composition.
//!
//! The command endpoint is `POST /api/execute`; `GET /health` is mounted at
//! the root.

pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the complete HTTP router with tracing, permissive CORS, a body
/// size limit and a per-request timeout.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
        .layer(DefaultBodyLimit::max(handlers::execute::MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::editor::InMemoryEditor;
    use crate::router::{ActorClassTable, CommandRouter};

    fn app() -> Router {
        let router = CommandRouter::new(
            Arc::new(InMemoryEditor::default()),
            ActorClassTable::default(),
        );
        build_router(
            AppState {
                router: Arc::new(router),
            },
            Duration::from_secs(5),
        )
    }

    async fn call(request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let Ok(response) = app().oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let headers = response.headers().clone();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body must be readable");
        };
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn execute(body: &str) -> Request<Body> {
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/api/execute")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("valid request");
        };
        request
    }

    #[tokio::test]
    async fn execute_returns_envelope_with_cors_header() {
        let (status, headers, body) = call(execute(r#"{"command":"Ping"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(
            headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(body, json!({"success": true, "data": {"pong": true}}));
    }

    #[tokio::test]
    async fn failures_are_still_200() {
        let (status, _, body) = call(execute(r#"{"command":"Foo"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "Unknown command: Foo"}));

        let (status, _, body) = call(execute("not json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "Invalid JSON"}));
    }

    #[tokio::test]
    async fn oversized_body_gets_failure_envelope() {
        let body = "x".repeat(handlers::execute::MAX_BODY_BYTES + 1);
        let (status, headers, body) = call(execute(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(body, json!({"success": false, "error": "Request too large"}));
    }

    #[tokio::test]
    async fn health_lists_commands() {
        let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
            panic!("valid request");
        };
        let (status, _, body) = call(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        let Some(commands) = body["commands"].as_array() else {
            panic!("commands must be an array");
        };
        assert!(commands.contains(&json!("CreateActor")));
    }
}
