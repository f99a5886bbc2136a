pub mod cache;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod store;

pub use cache::StaleCache;
pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, PgDocumentStore};
pub use repository::{Collection, Entity};
pub use store::{Document, DocumentStore, Filter, SortSpec};

use std::sync::Arc;

use crate::config::Config;

/// Opens the configured document store
///
/// Uses PostgreSQL when a database URL is configured, otherwise an in-memory
/// store seeded from the local JSON file.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgDocumentStore::new(pool))
        }
        None => Arc::new(MemoryStore::from_json_file(&config.seed_path).await?),
    };

    tracing::info!(backend = store.name(), "Document store ready");

    Ok(store)
}
