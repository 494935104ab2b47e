use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::TimeZone;
use http_body_util::BodyExt;
use tower::ServiceExt;

use coursegate_api::config::ServerConfig;
use coursegate_api::router::build_app_router;
use coursegate_api::state::{AppState, Clock};

/// Instant every test app evaluates unlock windows at.
pub const TEST_NOW: i64 = 1_750_000_000;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers and a clock
/// fixed at [`TEST_NOW`].
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        clock: Clock::Fixed(chrono::Utc.timestamp_opt(TEST_NOW, 0).unwrap()),
    };
    build_app_router(state, &config)
}

/// Send a GET request to `uri`.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
