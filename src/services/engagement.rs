use chrono::Utc;

use crate::{
    api::AppState,
    db::Filter,
    error::AppResult,
    models::{CourseView, CourseViewUpdate},
    services::catalog,
};

/// Records that `viewer_id` opened `course_id`
///
/// Increments the viewer's existing record for the course, or creates one
/// tagged with the course's category. The history cache is left alone, so new
/// views influence recommendations once the cached history goes stale.
pub async fn track_view(state: &AppState, course_id: &str, viewer_id: &str) -> AppResult<CourseView> {
    let course = catalog::get_course(state, course_id).await?;
    let views = state.collection::<CourseView>();

    let existing = views
        .find_one(
            Filter::new()
                .eq("course_id", course_id)
                .eq("user_id", viewer_id),
        )
        .await?;

    let view = match existing {
        Some(view) => {
            let update = CourseViewUpdate {
                view_count: view.views() + 1,
                last_accessed: Utc::now(),
            };
            views.update(&view.id, &update).await?
        }
        None => {
            let view = CourseView {
                course_id: course.id.clone(),
                user_id: viewer_id.to_string(),
                course_category: Some(course.category.clone()),
                view_count: Some(1),
                last_accessed: Some(Utc::now()),
                ..Default::default()
            };
            views.create(&view).await?
        }
    };

    tracing::info!(
        course_id = %course_id,
        viewer_id = %viewer_id,
        view_count = view.views(),
        "Tracked course view"
    );

    Ok(view)
}
