use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::middleware::RequestId;
use crate::models::{
    anonymous_viewer, Bookmark, Course, CourseView, DashboardSummary, NewAnswer, NewBookmark,
    NewCourse, NewQuestion, Question, UserProgress, ViewerQuery,
};
use crate::services::{bookmarks, catalog, dashboard, engagement, progress, questions, recommendations};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct CourseListQuery {
    pub search: Option<String>,
    /// Comma separated category names
    pub category: Option<String>,
}

impl CourseListQuery {
    fn categories(&self) -> Vec<String> {
        self.category
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default = "anonymous_viewer")]
    pub viewer_id: String,
    /// Overrides the category of the course being viewed
    pub category: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> AppResult<Json<Vec<Course>>> {
    let courses =
        catalog::list_courses(&state, query.search.as_deref(), &query.categories()).await?;
    Ok(Json(courses))
}

pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<NewCourse>,
) -> AppResult<(StatusCode, Json<Course>)> {
    let course = catalog::create_course(&state, request).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(catalog::categories(&state).await?))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<Course>> {
    Ok(Json(catalog::get_course(&state, &course_id).await?))
}

/// Record that a viewer opened a course
///
/// The viewer comes from a JSON body when one is sent, otherwise from the
/// `viewer_id` query parameter, otherwise it is anonymous.
pub async fn track_view(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(query): Query<ViewerQuery>,
    body: Option<Json<ViewerQuery>>,
) -> AppResult<Json<CourseView>> {
    let viewer = body.map(|Json(viewer)| viewer).unwrap_or(query);
    let view = engagement::track_view(&state, &course_id, &viewer.viewer_id).await?;
    Ok(Json(view))
}

/// "Recommended For You" shortlist for a course page
///
/// Responds 204 with no body when there is nothing to recommend, so clients
/// render no panel at all.
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(course_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Response> {
    tracing::debug!(
        request_id = %request_id,
        course_id = %course_id,
        viewer_id = %query.viewer_id,
        "Processing recommendation request"
    );

    let recommendations = recommendations::recommendations_for(
        &state,
        &course_id,
        &query.viewer_id,
        query.category.as_deref(),
    )
    .await?;

    if recommendations.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(recommendations).into_response())
}

pub async fn list_course_bookmarks(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<Vec<Bookmark>>> {
    Ok(Json(bookmarks::list_for_course(&state, &course_id).await?))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(request): Json<NewBookmark>,
) -> AppResult<(StatusCode, Json<Bookmark>)> {
    let bookmark = bookmarks::create_bookmark(&state, &course_id, request).await?;
    Ok((StatusCode::CREATED, Json(bookmark)))
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    Path(bookmark_id): Path<String>,
) -> AppResult<StatusCode> {
    bookmarks::delete_bookmark(&state, &bookmark_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_questions(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<Vec<Question>>> {
    Ok(Json(questions::list_for_course(&state, &course_id).await?))
}

pub async fn ask_question(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(request): Json<NewQuestion>,
) -> AppResult<(StatusCode, Json<Question>)> {
    let question = questions::ask(&state, &course_id, request).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn answer_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Json(request): Json<NewAnswer>,
) -> AppResult<Json<Question>> {
    Ok(Json(questions::answer(&state, &question_id, request).await?))
}

pub async fn upvote_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<Json<Question>> {
    Ok(Json(questions::upvote(&state, &question_id).await?))
}

pub async fn resolve_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<Json<Question>> {
    Ok(Json(questions::resolve(&state, &question_id).await?))
}

pub async fn list_progress(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
) -> AppResult<Json<Vec<UserProgress>>> {
    Ok(Json(progress::list_for_viewer(&state, &viewer_id).await?))
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    Path((viewer_id, course_id, lesson_index)): Path<(String, String, u32)>,
) -> AppResult<Json<UserProgress>> {
    let updated = progress::complete_lesson(&state, &viewer_id, &course_id, lesson_index).await?;
    Ok(Json(updated))
}

pub async fn toggle_saved(
    State(state): State<AppState>,
    Path((viewer_id, course_id)): Path<(String, String)>,
) -> AppResult<Json<UserProgress>> {
    Ok(Json(progress::toggle_saved(&state, &viewer_id, &course_id).await?))
}

pub async fn delete_progress(
    State(state): State<AppState>,
    Path(progress_id): Path<String>,
) -> AppResult<StatusCode> {
    progress::delete_progress(&state, &progress_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_viewer_bookmarks(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
) -> AppResult<Json<Vec<Bookmark>>> {
    Ok(Json(bookmarks::list_for_viewer(&state, &viewer_id).await?))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
) -> AppResult<Json<DashboardSummary>> {
    Ok(Json(dashboard::summary(&state, &viewer_id).await?))
}
