//! Browser-facing surface: the single-page form, its JSON endpoint and the
//! optional bearer-token guard shared with the remote MCP route.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;

use crate::checker::SimilarityChecker;
use crate::error::SimilarityError;
use crate::models::{AnalysisResult, CheckRequest};

const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<SimilarityChecker>,
}

/// HTTP mapping of checker errors
pub struct ApiError(SimilarityError);

impl From<SimilarityError> for ApiError {
    fn from(e: SimilarityError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SimilarityError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SimilarityError::Transport(_) | SimilarityError::Parse(_) => StatusCode::BAD_GATEWAY,
            SimilarityError::Config(_) | SimilarityError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.0.user_message(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub fn router(checker: Arc<SimilarityChecker>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/check", post(check))
        .with_state(AppState { checker })
}

/// Requires `Authorization: Bearer <token>` on everything except the page
/// itself and the health check. The page forwards the `?token=` it was
/// opened with as that header.
pub fn require_bearer(router: Router, token: String) -> Router {
    router.layer(middleware::from_fn_with_state(
        Arc::new(token),
        bearer_guard,
    ))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result = state
        .checker
        .check(&req.source_text, &req.text_to_check, req.use_web_search)
        .await?;
    Ok(Json(result))
}

async fn bearer_guard(
    State(expected): State<Arc<String>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path == "/" || path == "/health" {
        return next.run(req).await;
    }
    let headers: &HeaderMap = req.headers();
    let header_ok = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", expected.as_str()));
    // Fallback for clients that cannot set headers: ?access_token= or ?token=
    let query_ok = req.uri().query().is_some_and(|q| {
        q.split('&').any(|pair| {
            pair.split_once('=').is_some_and(|(k, v)| {
                (k == "access_token" || k == "token") && v == expected.as_str()
            })
        })
    });
    if !(header_ok || query_ok) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::AnalysisInvoker;
    use crate::models::GenerateContentResponse;
    use crate::transport::MockTransport;
    use crate::validation::{InputValidator, MISSING_BOTH_TEXTS};
    use tower::ServiceExt;

    fn app(mock: MockTransport) -> Router {
        let checker = SimilarityChecker::new(
            AnalysisInvoker::new(Arc::new(mock), "test-model".to_string(), 0.2),
            InputValidator::new(10_000),
        );
        router(Arc::new(checker))
    }

    fn post_check(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/check")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let app = app(MockTransport::new());
        let resp = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("index responds");
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("health responds");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_check_validation_error_is_422() {
        let mut mock = MockTransport::new();
        mock.expect_generate_content().times(0);

        let resp = app(mock)
            .oneshot(post_check(json!({
                "sourceText": "",
                "textToCheck": "hello",
                "useWebSearch": false
            })))
            .await
            .expect("check responds");
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(resp).await;
        assert_eq!(body["error"], json!(MISSING_BOTH_TEXTS));
    }

    #[tokio::test]
    async fn test_check_success_returns_result() {
        let mut mock = MockTransport::new();
        mock.expect_generate_content().times(1).returning(|_, _| {
            let resp: GenerateContentResponse = serde_json::from_value(json!({
                "candidates": [{ "content": { "parts": [{
                    "text": "{\"overallSimilarityPercentage\": 40, \"summary\": \"Some\", \"similarities\": []}"
                }] } }]
            }))
            .expect("mock response should deserialize");
            Ok(resp)
        });

        let resp = app(mock)
            .oneshot(post_check(json!({
                "sourceText": "a b c",
                "textToCheck": "a b d"
            })))
            .await
            .expect("check responds");
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["overallSimilarityPercentage"], json!(40.0));
        assert_eq!(body["matches"], json!([]));
        assert!(body.get("webCitations").is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_502() {
        let mut mock = MockTransport::new();
        mock.expect_generate_content().times(1).returning(|_, _| {
            Err(SimilarityError::Transport(
                "Failed to send request to Gemini API: connection refused".to_string(),
            ))
        });

        let resp = app(mock)
            .oneshot(post_check(json!({
                "sourceText": "a",
                "textToCheck": "b"
            })))
            .await
            .expect("check responds");
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(resp).await;
        assert_eq!(
            body["error"],
            json!("Failed to check plagiarism: Failed to send request to Gemini API: connection refused")
        );
    }

    #[tokio::test]
    async fn test_bearer_guard() {
        let app = require_bearer(app(MockTransport::new()), "secret".to_string());

        let resp = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("health responds");
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .clone()
            .oneshot(post_check(json!({ "sourceText": "", "textToCheck": "" })))
            .await
            .expect("check responds");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let authorized = Request::builder()
            .method("POST")
            .uri("/api/check?token=secret")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({ "sourceText": "", "textToCheck": "" }).to_string(),
            ))
            .expect("request should build");
        let resp = app.oneshot(authorized).await.expect("check responds");
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_bearer_guard_admits_page_request() {
        let mut mock = MockTransport::new();
        mock.expect_generate_content().times(0);
        let app = require_bearer(app(mock), "secret".to_string());

        // Same shape as the page's fetch when opened at /?token=secret
        let from_page = Request::builder()
            .method("POST")
            .uri("/api/check")
            .header("Content-Type", "application/json")
            .header("Authorization", "Bearer secret")
            .body(Body::from(
                json!({ "sourceText": "", "textToCheck": "", "useWebSearch": false }).to_string(),
            ))
            .expect("request should build");
        let resp = app.clone().oneshot(from_page).await.expect("check responds");
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let wrong_token = Request::builder()
            .method("POST")
            .uri("/api/check")
            .header("Content-Type", "application/json")
            .header("Authorization", "Bearer nope")
            .body(Body::from(json!({ "sourceText": "", "textToCheck": "" }).to_string()))
            .expect("request should build");
        let resp = app.clone().oneshot(wrong_token).await.expect("check responds");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let page = app
            .oneshot(Request::get("/?token=secret").body(Body::empty()).expect("request"))
            .await
            .expect("index responds");
        assert_eq!(page.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(page.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("new URLSearchParams(location.search).get('token')"));
        assert!(html.contains("'Bearer ' + token"));
    }
}
