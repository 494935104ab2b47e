pub mod health;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route reads the host boundary input from the query string.
///
/// ```text
/// /course                                          decoded course payload
/// /dashboard                                       full page view
/// /modules/{index}                                 single module view
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/course", get(handlers::course::get_course))
        .route("/dashboard", get(handlers::course::get_dashboard))
        .route("/modules/{index}", get(handlers::course::get_module))
}
