//! Handlers for decoding a host boundary read and rendering its module views.
//!
//! Each request builds a fresh [`CourseSession`] from its own query string and
//! evaluates it at the request's instant. Nothing is kept between requests.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use coursegate_core::course::{CoursePayload, ModuleIndex};
use coursegate_core::decoder::{self, DecodeStrategy};
use coursegate_core::progress::ModuleProgress;
use coursegate_core::session::CourseSession;

use crate::error::AppResult;
use crate::query::Boundary;
use crate::response::DataResponse;
use crate::state::AppState;

/// Decoded course with the strategy that produced it.
#[derive(Debug, Serialize)]
pub struct DecodedCourse {
    pub strategy: DecodeStrategy,
    pub course: CoursePayload,
    pub progress: ModuleProgress,
}

/// GET /course
///
/// Decode the boundary input into the canonical course payload. `data` is
/// `null` when the input carries no course data.
pub async fn get_course(Boundary(input): Boundary) -> impl IntoResponse {
    let data = decoder::decode(&input).map(|decoded| DecodedCourse {
        strategy: decoded.strategy,
        course: decoded.payload,
        progress: decoded.progress,
    });

    Json(DataResponse { data })
}

/// GET /dashboard
///
/// Render the full page view: user, course header, eight module views and
/// the additional sections.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Boundary(input): Boundary,
) -> impl IntoResponse {
    let now = state.clock.now();
    let session = CourseSession::from_boundary(&input);
    let view = session.dashboard(now);

    tracing::debug!(
        course_loaded = view.course.is_some(),
        unlocked = view.modules.iter().filter(|m| m.unlocked).count(),
        all_completed = view.all_modules_completed,
        "Dashboard rendered"
    );

    Json(DataResponse { data: view })
}

/// GET /modules/{index}
///
/// Render a single module view. Returns 400 when `index` is not in `1..=8`.
pub async fn get_module(
    State(state): State<AppState>,
    Path(index): Path<String>,
    Boundary(input): Boundary,
) -> AppResult<impl IntoResponse> {
    let index: ModuleIndex = index.parse()?;
    let session = CourseSession::from_boundary(&input);

    Ok(Json(DataResponse {
        data: session.module_view(index, state.clock.now()),
    }))
}
