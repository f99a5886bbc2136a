use crate::{
    api::AppState,
    error::{AppError, AppResult},
    models::{Course, NewCourse},
};

/// Lists the catalog, optionally narrowed by a search term and categories
///
/// The search term matches title or category case-insensitively. When
/// `categories` is non-empty a course must belong to one of them.
pub async fn list_courses(
    state: &AppState,
    search: Option<&str>,
    categories: &[String],
) -> AppResult<Vec<Course>> {
    let catalog = state.catalog().await?;
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    Ok(catalog
        .iter()
        .filter(|course| search.map_or(true, |q| course.matches_search(q)))
        .filter(|course| categories.is_empty() || categories.contains(&course.category))
        .cloned()
        .collect())
}

/// Distinct non-empty categories in catalog order
pub async fn categories(state: &AppState) -> AppResult<Vec<String>> {
    let catalog = state.catalog().await?;
    let mut seen: Vec<String> = Vec::new();
    for course in catalog.iter() {
        if !course.category.is_empty() && !seen.contains(&course.category) {
            seen.push(course.category.clone());
        }
    }
    Ok(seen)
}

pub async fn get_course(state: &AppState, id: &str) -> AppResult<Course> {
    state
        .collection::<Course>()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", id)))
}

/// Adds a course and drops the cached catalog so listings pick it up
pub async fn create_course(state: &AppState, request: NewCourse) -> AppResult<Course> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Course title is required".to_string()));
    }

    let course = state.collection::<Course>().create(&request).await?;
    state.catalog_cache.invalidate(&()).await;

    tracing::info!(course_id = %course.id, category = %course.category, "Course created");

    Ok(course)
}
