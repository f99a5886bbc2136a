use chrono::Utc;

use crate::{
    api::AppState,
    db::{Filter, SortSpec},
    error::{AppError, AppResult},
    models::{Bookmark, NewBookmark},
    services::catalog,
};

pub async fn create_bookmark(
    state: &AppState,
    course_id: &str,
    request: NewBookmark,
) -> AppResult<Bookmark> {
    if request.lesson_title.trim().is_empty() {
        return Err(AppError::InvalidInput("Lesson title is required".to_string()));
    }

    let course = catalog::get_course(state, course_id).await?;
    let bookmark = Bookmark {
        id: String::new(),
        user_id: request.viewer_id,
        course_id: course.id,
        course_title: course.title,
        lesson_title: request.lesson_title,
        lesson_index: request.lesson_index,
        notes: request.notes,
        created_at: Some(Utc::now()),
    };

    let bookmark = state.collection::<Bookmark>().create(&bookmark).await?;
    tracing::info!(
        bookmark_id = %bookmark.id,
        course_id = %course_id,
        lesson_index = bookmark.lesson_index,
        "Bookmark created"
    );

    Ok(bookmark)
}

pub async fn delete_bookmark(state: &AppState, id: &str) -> AppResult<()> {
    state.collection::<Bookmark>().delete(id).await?;
    tracing::info!(bookmark_id = %id, "Bookmark removed");
    Ok(())
}

/// Bookmarks on a course, newest first
pub async fn list_for_course(state: &AppState, course_id: &str) -> AppResult<Vec<Bookmark>> {
    state
        .collection::<Bookmark>()
        .filter(
            Filter::new().eq("course_id", course_id),
            Some(SortSpec::desc("created_at")),
        )
        .await
}

/// A viewer's bookmarks across all courses, newest first
pub async fn list_for_viewer(state: &AppState, viewer_id: &str) -> AppResult<Vec<Bookmark>> {
    state
        .collection::<Bookmark>()
        .filter(
            Filter::new().eq("user_id", viewer_id),
            Some(SortSpec::desc("created_at")),
        )
        .await
}
