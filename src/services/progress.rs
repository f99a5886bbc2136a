use chrono::Utc;

use crate::{
    api::AppState,
    db::{Filter, SortSpec},
    error::AppResult,
    models::{Course, ProgressUpdate, UserProgress, DEFAULT_TOTAL_LESSONS},
    services::catalog,
};

/// Minutes credited for each completed lesson
pub const MINUTES_PER_LESSON: u64 = 30;

pub async fn get_progress(
    state: &AppState,
    viewer_id: &str,
    course_id: &str,
) -> AppResult<Option<UserProgress>> {
    state
        .collection::<UserProgress>()
        .find_one(
            Filter::new()
                .eq("user_id", viewer_id)
                .eq("course_id", course_id),
        )
        .await
}

/// A viewer's progress records, most recently accessed first
pub async fn list_for_viewer(state: &AppState, viewer_id: &str) -> AppResult<Vec<UserProgress>> {
    state
        .collection::<UserProgress>()
        .filter(
            Filter::new().eq("user_id", viewer_id),
            Some(SortSpec::desc("last_accessed")),
        )
        .await
}

/// Marks a lesson complete
///
/// Completing an already completed lesson changes nothing. Otherwise the
/// lesson is appended and time spent grows by [`MINUTES_PER_LESSON`].
pub async fn complete_lesson(
    state: &AppState,
    viewer_id: &str,
    course_id: &str,
    lesson_index: u32,
) -> AppResult<UserProgress> {
    let existing = get_progress(state, viewer_id, course_id).await?;

    if let Some(progress) = &existing {
        if progress.completed_lessons.contains(&lesson_index) {
            return Ok(progress.clone());
        }
    }

    let mut completed = existing
        .as_ref()
        .map(|p| p.completed_lessons.clone())
        .unwrap_or_default();
    completed.push(lesson_index);

    let update = ProgressUpdate {
        completed_lessons: Some(completed),
        last_accessed: Some(Utc::now()),
        time_spent_minutes: Some(
            existing.as_ref().map_or(0, |p| p.time_spent_minutes) + MINUTES_PER_LESSON,
        ),
        ..Default::default()
    };

    let progress = save(state, viewer_id, course_id, existing, update).await?;
    tracing::info!(
        viewer_id = %viewer_id,
        course_id = %course_id,
        lesson_index,
        percentage = progress.percentage(),
        "Lesson completed"
    );

    Ok(progress)
}

/// Flips the saved flag of a course for a viewer
pub async fn toggle_saved(
    state: &AppState,
    viewer_id: &str,
    course_id: &str,
) -> AppResult<UserProgress> {
    let existing = get_progress(state, viewer_id, course_id).await?;
    let update = ProgressUpdate {
        is_saved: Some(!existing.as_ref().is_some_and(|p| p.is_saved)),
        last_accessed: Some(Utc::now()),
        ..Default::default()
    };

    save(state, viewer_id, course_id, existing, update).await
}

pub async fn delete_progress(state: &AppState, id: &str) -> AppResult<()> {
    state.collection::<UserProgress>().delete(id).await?;
    tracing::info!(progress_id = %id, "Progress removed");
    Ok(())
}

/// Applies `update` to the existing record, or creates one with a snapshot of the course
async fn save(
    state: &AppState,
    viewer_id: &str,
    course_id: &str,
    existing: Option<UserProgress>,
    update: ProgressUpdate,
) -> AppResult<UserProgress> {
    let progress = state.collection::<UserProgress>();

    match existing {
        Some(current) => progress.update(&current.id, &update).await,
        None => {
            let course = catalog::get_course(state, course_id).await?;
            progress.create(&new_record(viewer_id, &course, update)).await
        }
    }
}

fn new_record(viewer_id: &str, course: &Course, update: ProgressUpdate) -> UserProgress {
    UserProgress {
        id: String::new(),
        user_id: viewer_id.to_string(),
        course_id: course.id.clone(),
        completed_lessons: update.completed_lessons.unwrap_or_default(),
        last_accessed: update.last_accessed,
        time_spent_minutes: update.time_spent_minutes.unwrap_or(0),
        total_lessons: Some(DEFAULT_TOTAL_LESSONS),
        is_saved: update.is_saved.unwrap_or(false),
        course_title: Some(course.title.clone()),
        course_category: Some(course.category.clone()),
        course_image: Some(course.image_url.clone()),
        course_duration: Some(course.duration.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> AppState {
        let store = MemoryStore::from_seed(json!({
            "courses": [
                {"id": "ml", "title": "Machine Learning", "category": "AI", "duration": "8 weeks"}
            ]
        }))
        .unwrap();
        AppState::with_store(Arc::new(store))
    }

    #[tokio::test]
    async fn test_first_lesson_creates_record_with_snapshot() {
        let state = state();
        let progress = complete_lesson(&state, "u-1", "ml", 0).await.unwrap();
        assert_eq!(progress.completed_lessons, vec![0]);
        assert_eq!(progress.time_spent_minutes, 30);
        assert_eq!(progress.total_lessons, Some(10));
        assert_eq!(progress.course_title.as_deref(), Some("Machine Learning"));
        assert_eq!(progress.course_duration.as_deref(), Some("8 weeks"));
        assert_eq!(progress.percentage(), 10);
    }

    #[tokio::test]
    async fn test_completing_lessons_accumulates() {
        let state = state();
        complete_lesson(&state, "u-1", "ml", 0).await.unwrap();
        let progress = complete_lesson(&state, "u-1", "ml", 4).await.unwrap();
        assert_eq!(progress.completed_lessons, vec![0, 4]);
        assert_eq!(progress.time_spent_minutes, 60);
        assert_eq!(list_for_viewer(&state, "u-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completing_same_lesson_twice_is_noop() {
        let state = state();
        complete_lesson(&state, "u-1", "ml", 2).await.unwrap();
        let progress = complete_lesson(&state, "u-1", "ml", 2).await.unwrap();
        assert_eq!(progress.completed_lessons, vec![2]);
        assert_eq!(progress.time_spent_minutes, 30);
    }

    #[tokio::test]
    async fn test_toggle_saved() {
        let state = state();
        let saved = toggle_saved(&state, "u-1", "ml").await.unwrap();
        assert!(saved.is_saved);
        assert!(saved.completed_lessons.is_empty());

        let unsaved = toggle_saved(&state, "u-1", "ml").await.unwrap();
        assert!(!unsaved.is_saved);
        assert_eq!(unsaved.id, saved.id);
    }

    #[tokio::test]
    async fn test_progress_on_unknown_course() {
        let result = complete_lesson(&state(), "u-1", "nope", 0).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_progress() {
        let state = state();
        let progress = complete_lesson(&state, "u-1", "ml", 0).await.unwrap();
        delete_progress(&state, &progress.id).await.unwrap();
        assert!(get_progress(&state, "u-1", "ml").await.unwrap().is_none());
    }
}
