pub mod health;
pub mod match_resume;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::AppError;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Converts a handler panic into the same JSON 500 body as any other failure.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("An error occurred: {detail}") })),
    )
        .into_response()
}

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/match_resume", post(match_resume::handle_match_resume))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(state_with(
            FakeExtractor::new(ExtractOutcome::Text("resume")),
            FakeLlm::replying(r#"{"score": 1}"#),
        ))
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"message": "Resume Matcher API is running."})
        );
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-matcher-api");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_json_500() {
        let app = build_router(state_with(
            FakeExtractor::new(ExtractOutcome::Text("resume")),
            FakeLlm::new(LlmOutcome::Panic),
        ));
        let pdf = b"%PDF-1.4";
        let response = app
            .oneshot(match_request(&[
                Part::Text("job_description", "Rust developer"),
                pdf_part(pdf),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "An error occurred: model client exploded"})
        );
    }
}
