use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/courses", get(handlers::list_courses).post(handlers::create_course))
        .route("/courses/categories", get(handlers::list_categories))
        .route("/courses/:course_id", get(handlers::get_course))
        // Engagement & recommendations
        .route("/courses/:course_id/views", post(handlers::track_view))
        .route(
            "/courses/:course_id/recommendations",
            get(handlers::get_recommendations),
        )
        // Bookmarks
        .route(
            "/courses/:course_id/bookmarks",
            get(handlers::list_course_bookmarks).post(handlers::create_bookmark),
        )
        .route("/bookmarks/:bookmark_id", delete(handlers::delete_bookmark))
        // Q&A
        .route(
            "/courses/:course_id/questions",
            get(handlers::list_questions).post(handlers::ask_question),
        )
        .route("/questions/:question_id/answers", post(handlers::answer_question))
        .route("/questions/:question_id/upvote", post(handlers::upvote_question))
        .route("/questions/:question_id/resolve", post(handlers::resolve_question))
        // Viewer progress & dashboard
        .route("/viewers/:viewer_id/progress", get(handlers::list_progress))
        .route(
            "/viewers/:viewer_id/progress/:course_id/lessons/:lesson_index",
            post(handlers::complete_lesson),
        )
        .route(
            "/viewers/:viewer_id/progress/:course_id/saved",
            post(handlers::toggle_saved),
        )
        .route("/progress/:progress_id", delete(handlers::delete_progress))
        .route("/viewers/:viewer_id/bookmarks", get(handlers::list_viewer_bookmarks))
        .route("/viewers/:viewer_id/dashboard", get(handlers::get_dashboard))
}
