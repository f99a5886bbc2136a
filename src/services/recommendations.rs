use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    error::AppResult,
    models::{CategoryTotal, Course, CourseView, Recommendation},
};

/// Score added once to the category of the course being viewed
pub const CATEGORY_BOOST: u64 = 5;

/// Score added to courses flagged as popular
pub const POPULARITY_BOOST: u64 = 3;

/// Maximum number of recommendations returned
pub const SHORTLIST_LEN: usize = 4;

/// Tunable weights of the recommendation heuristic, overridable through configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub category_boost: u64,
    pub popularity_boost: u64,
    pub shortlist_len: usize,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            category_boost: CATEGORY_BOOST,
            popularity_boost: POPULARITY_BOOST,
            shortlist_len: SHORTLIST_LEN,
        }
    }
}

/// Accumulated view counts per category
///
/// Categories are open-ended strings discovered from the data. Lookups of
/// unknown categories return zero. Iteration follows first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryScores {
    totals: HashMap<String, u64>,
    order: Vec<String>,
}

impl CategoryScores {
    /// Folds engagement records into per-category totals
    ///
    /// Records without a category are skipped; a missing view count adds zero.
    pub fn from_history(history: &[CourseView]) -> Self {
        let mut scores = Self::default();
        for view in history {
            if let Some(category) = view.category() {
                scores.add(category, view.views());
            }
        }
        scores
    }

    pub fn add(&mut self, category: &str, amount: u64) {
        match self.totals.get_mut(category) {
            Some(total) => *total = total.saturating_add(amount),
            None => {
                self.order.push(category.to_string());
                self.totals.insert(category.to_string(), amount);
            }
        }
    }

    pub fn get(&self, category: &str) -> u64 {
        self.totals.get(category).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order
            .iter()
            .map(|category| (category.as_str(), self.get(category)))
    }

    /// Highest scoring category; ties go to the one seen first
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (category, score) in self.iter() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((category, score));
            }
        }
        best.map(|(category, _)| category)
    }

    pub fn to_totals(&self) -> Vec<CategoryTotal> {
        self.iter()
            .map(|(category, views)| CategoryTotal {
                category: category.to_string(),
                views,
            })
            .collect()
    }
}

/// Ranks catalog courses for a viewer using the default policy
///
/// See [`recommend_with_policy`].
pub fn recommend(
    current_course_id: &str,
    current_category: &str,
    history: &[CourseView],
    catalog: &[Course],
) -> Vec<Recommendation> {
    recommend_with_policy(
        &ScoringPolicy::default(),
        current_course_id,
        current_category,
        history,
        catalog,
    )
}

/// Ranks catalog courses for a viewer
///
/// Each course other than the current one scores the viewer's accumulated
/// views in its category, plus `category_boost` when that category is the one
/// being viewed, plus `popularity_boost` for popular courses. The result is
/// ordered by descending score with ties kept in catalog order, and holds at
/// most `shortlist_len` entries. An empty result means nothing should be shown.
pub fn recommend_with_policy(
    policy: &ScoringPolicy,
    current_course_id: &str,
    current_category: &str,
    history: &[CourseView],
    catalog: &[Course],
) -> Vec<Recommendation> {
    let mut scores = CategoryScores::from_history(history);
    if !current_category.is_empty() {
        scores.add(current_category, policy.category_boost);
    }

    let mut ranked: Vec<Recommendation> = catalog
        .iter()
        .filter(|course| course.id != current_course_id)
        .map(|course| {
            let popularity = if course.is_popular {
                policy.popularity_boost
            } else {
                0
            };
            Recommendation {
                score: scores.get(&course.category).saturating_add(popularity),
                course: course.clone(),
            }
        })
        .collect();

    // sort_by is stable: equal scores keep catalog order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(policy.shortlist_len);
    ranked
}

/// The category a viewer has engaged with most, if any
pub fn favorite_category(history: &[CourseView]) -> Option<String> {
    CategoryScores::from_history(history).top().map(str::to_string)
}

/// Builds the "Recommended For You" shortlist for a course page
///
/// The catalog and the viewer's history come through the state's staleness
/// caches. The current category is `category` when given, otherwise the
/// category of `course_id` in the catalog, otherwise empty.
pub async fn recommendations_for(
    state: &AppState,
    course_id: &str,
    viewer_id: &str,
    category: Option<&str>,
) -> AppResult<Vec<Recommendation>> {
    let catalog = state.catalog().await?;
    let history = state.history(viewer_id).await?;

    let current_category = match category {
        Some(category) => category.to_string(),
        None => catalog
            .iter()
            .find(|course| course.id == course_id)
            .map(|course| course.category.clone())
            .unwrap_or_default(),
    };

    let recommendations = recommend_with_policy(
        &state.policy,
        course_id,
        &current_category,
        &history,
        &catalog,
    );

    tracing::info!(
        course_id = %course_id,
        viewer_id = %viewer_id,
        category = %current_category,
        history_len = history.len(),
        catalog_len = catalog.len(),
        returned = recommendations.len(),
        "Computed recommendations"
    );

    Ok(recommendations)
}
