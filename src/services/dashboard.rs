use crate::{
    api::AppState,
    db::{Filter, SortSpec},
    error::AppResult,
    models::{CourseView, DashboardSummary},
    services::{progress, recommendations::CategoryScores},
};

/// Learning stats and engagement overview for a viewer
///
/// Reads history straight from the store rather than the recommendation cache,
/// so the numbers reflect the latest tracked views.
pub async fn summary(state: &AppState, viewer_id: &str) -> AppResult<DashboardSummary> {
    let records = progress::list_for_viewer(state, viewer_id).await?;
    let history = state
        .collection::<CourseView>()
        .filter(
            Filter::new().eq("user_id", viewer_id),
            Some(SortSpec::desc("view_count")),
        )
        .await?;

    let scores = CategoryScores::from_history(&history);
    let total_minutes: u64 = records.iter().map(|p| p.time_spent_minutes).sum();

    Ok(DashboardSummary {
        viewer_id: viewer_id.to_string(),
        in_progress: records.iter().filter(|p| p.is_in_progress()).count(),
        completed: records.iter().filter(|p| p.is_completed()).count(),
        saved: records.iter().filter(|p| p.is_saved).count(),
        hours_learned: (total_minutes as f64 / 60.0).round() as u64,
        favorite_category: scores.top().map(str::to_string),
        category_scores: scores.to_totals(),
    })
}
