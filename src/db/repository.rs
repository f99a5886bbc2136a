use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use super::store::{document_id, into_document, Document, DocumentStore, Filter, SortSpec};
use crate::error::AppResult;

/// A type stored as documents in a named collection
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
}

/// Typed view over one collection of a [`DocumentStore`]
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn list(&self, sort: Option<SortSpec>) -> AppResult<Vec<T>> {
        self.filter(Filter::new(), sort).await
    }

    /// Lists matching entities, skipping documents that fail to decode
    pub async fn filter(&self, filter: Filter, sort: Option<SortSpec>) -> AppResult<Vec<T>> {
        let docs = self.store.query(T::COLLECTION, filter, sort).await?;
        Ok(docs.into_iter().filter_map(decode_lenient::<T>).collect())
    }

    /// First entity matching `filter`, in insertion order
    pub async fn find_one(&self, filter: Filter) -> AppResult<Option<T>> {
        Ok(self.filter(filter, None).await?.into_iter().next())
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<T>> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Stores `value`. An empty `id` field is dropped so the store assigns one.
    pub async fn create<V: Serialize>(&self, value: &V) -> AppResult<T> {
        let mut doc = into_document(serde_json::to_value(value)?)?;
        if document_id(&doc).is_some_and(str::is_empty) {
            doc.remove("id");
        }
        let created = self.store.create(T::COLLECTION, doc).await?;
        decode(created)
    }

    /// Merges the serialized fields of `patch` into the stored entity
    pub async fn update<P: Serialize>(&self, id: &str, patch: &P) -> AppResult<T> {
        let patch = into_document(serde_json::to_value(patch)?)?;
        let updated = self.store.update(T::COLLECTION, id, patch).await?;
        decode(updated)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.store.delete(T::COLLECTION, id).await
    }
}

fn decode<T: DeserializeOwned>(doc: Document) -> AppResult<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}

fn decode_lenient<T: Entity>(doc: Document) -> Option<T> {
    let id = document_id(&doc).unwrap_or("<none>").to_string();
    match decode(doc) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                collection = T::COLLECTION,
                id = %id,
                error = %e,
                "Skipping malformed document"
            );
            None
        }
    }
}
