use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{document_id, into_document, Document, DocumentStore, Filter, SortSpec};
use crate::error::{AppError, AppResult};

/// In-process document store, optionally seeded from a local JSON file
///
/// Collections keep documents in insertion order so unsorted listings are
/// deterministic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a JSON object mapping collection names to arrays of documents
    ///
    /// Documents without an id get a generated one.
    pub fn from_seed(seed: Value) -> AppResult<Self> {
        let seed = into_document(seed)?;
        let mut collections = HashMap::new();

        for (name, docs) in seed {
            let Value::Array(items) = docs else {
                return Err(AppError::InvalidInput(format!(
                    "Seed collection {} is not an array",
                    name
                )));
            };
            let mut stored = Vec::with_capacity(items.len());
            for item in items {
                stored.push(with_id(into_document(item)?));
            }
            tracing::debug!(collection = %name, count = stored.len(), "Seeded collection");
            collections.insert(name, stored);
        }

        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    /// Loads a seed file. A missing file yields an empty store.
    pub async fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Seed file not found, starting empty");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to read seed file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let seed: Value = serde_json::from_str(&raw)?;
        let store = Self::from_seed(seed)?;
        tracing::info!(path = %path.display(), "Loaded seed data");
        Ok(store)
    }
}

fn with_id(mut doc: Document) -> Document {
    if document_id(&doc).is_none() {
        doc.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    doc
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<SortSpec>,
    ) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = sort {
            sort.apply(&mut docs);
        }

        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn create(&self, collection: &str, doc: Document) -> AppResult<Document> {
        let doc = with_id(doc);
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let id = document_id(&doc).unwrap_or_default();
        match docs.iter_mut().find(|d| document_id(d) == Some(id)) {
            Some(existing) => *existing = doc.clone(),
            None => docs.push(doc.clone()),
        }

        Ok(doc)
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> AppResult<Document> {
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| document_id(d) == Some(id)))
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", collection, id)))?;

        for (field, value) in patch {
            if field != "id" {
                doc.insert(field, value);
            }
        }

        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", collection, id)))?;

        let before = docs.len();
        docs.retain(|d| document_id(d) != Some(id));
        if docs.len() == before {
            return Err(AppError::NotFound(format!("{}/{}", collection, id)));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
