use std::sync::Arc;

use crate::config::Config;
use crate::db::{Collection, DocumentStore, Entity, Filter, SortSpec, StaleCache};
use crate::error::AppResult;
use crate::models::{Course, CourseView};
use crate::services::recommendations::ScoringPolicy;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// Full course catalog, keyed by unit since there is only one
    pub catalog_cache: StaleCache<(), Vec<Course>>,
    /// Engagement history per viewer id
    pub history_cache: StaleCache<String, Vec<CourseView>>,
    pub policy: ScoringPolicy,
}

impl AppState {
    /// Creates application state with cache windows and scoring policy from `config`
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            store,
            catalog_cache: StaleCache::new("catalog", config.stale_after(), config.evict_after()),
            history_cache: StaleCache::new("history", config.stale_after(), config.evict_after()),
            policy: config.scoring_policy(),
        }
    }

    /// Creates application state with default settings
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, &Config::default())
    }

    pub fn collection<T: Entity>(&self) -> Collection<T> {
        Collection::new(self.store.clone())
    }

    /// The course catalog, refetched once the cached copy is stale
    pub async fn catalog(&self) -> AppResult<Arc<Vec<Course>>> {
        let courses = self.collection::<Course>();
        self.catalog_cache
            .get_or_refresh((), || async move { courses.list(None).await })
            .await
    }

    /// A viewer's engagement records, most viewed first
    pub async fn history(&self, viewer_id: &str) -> AppResult<Arc<Vec<CourseView>>> {
        let views = self.collection::<CourseView>();
        let filter = Filter::new().eq("user_id", viewer_id);
        self.history_cache
            .get_or_refresh(viewer_id.to_string(), || async move {
                views.filter(filter, Some(SortSpec::desc("view_count"))).await
            })
            .await
    }
}
