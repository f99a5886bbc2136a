use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// A stored JSON object. Every document carries a string `id` field.
pub type Document = Map<String, Value>;

/// Trait for document backends
///
/// Mirrors the small surface the application needs from a document database:
/// filtered listing, point lookups, set-style creates, shallow merges and
/// deletes. Implementations must return documents in insertion order when no
/// sort is requested.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists documents in `collection` matching every equality in `filter`
    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<SortSpec>,
    ) -> AppResult<Vec<Document>>;

    /// Fetches one document by id
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;

    /// Stores a document, generating an id when it has none
    ///
    /// A document with an explicit id replaces any existing document with that id.
    async fn create(&self, collection: &str, doc: Document) -> AppResult<Document>;

    /// Merges the top-level fields of `patch` into an existing document
    async fn update(&self, collection: &str, id: &str, patch: Document) -> AppResult<Document>;

    /// Removes a document
    async fn delete(&self, collection: &str, id: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Conjunction of field equality constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }

    /// The filter as a JSON object, suitable for containment queries
    pub fn to_object(&self) -> Document {
        self.clauses.iter().cloned().collect()
    }
}

/// Sort order parsed from strings like `"-view_count"` (descending) or `"title"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Compares two documents on the sort field. Documents missing the field
    /// always order last, whatever the direction.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        match (present(a.get(&self.field)), present(b.get(&self.field))) {
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                if self.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Stable in-place sort of `docs`
    pub fn apply(&self, docs: &mut [Document]) {
        docs.sort_by(|a, b| self.compare(a, b));
    }
}

impl FromStr for SortSpec {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, descending) = match s.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if field.is_empty() {
            return Err(AppError::InvalidInput(format!("Invalid sort: {:?}", s)));
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// Mixed types order by kind: booleans, numbers, strings, then anything else
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Reads the `id` field of a document
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

/// Converts a JSON value into a document, rejecting anything but objects
pub fn into_document(value: Value) -> AppResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(format!(
            "Expected a JSON object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        into_document(value).unwrap()
    }

    #[test]
    fn test_parse_descending_sort() {
        let sort: SortSpec = "-view_count".parse().unwrap();
        assert_eq!(sort, SortSpec::desc("view_count"));
    }

    #[test]
    fn test_parse_ascending_sort() {
        let sort: SortSpec = "created_at".parse().unwrap();
        assert_eq!(sort, SortSpec::asc("created_at"));
    }

    #[test]
    fn test_parse_empty_sort_fails() {
        assert!("-".parse::<SortSpec>().is_err());
        assert!("".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_numeric_sort_descending_missing_last() {
        let mut docs = vec![
            doc(json!({"id": "a", "view_count": 2})),
            doc(json!({"id": "b"})),
            doc(json!({"id": "c", "view_count": 10})),
            doc(json!({"id": "d", "view_count": null})),
        ];
        SortSpec::desc("view_count").apply(&mut docs);
        let ids: Vec<_> = docs.iter().filter_map(document_id).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut docs = vec![
            doc(json!({"id": "a", "rank": 1})),
            doc(json!({"id": "b", "rank": 1})),
            doc(json!({"id": "c", "rank": 0})),
        ];
        SortSpec::asc("rank").apply(&mut docs);
        let ids: Vec<_> = docs.iter().filter_map(document_id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_filter_matches_all_clauses() {
        let filter = Filter::new().eq("course_id", "c-1").eq("user_id", "u-1");
        assert!(filter.matches(&doc(json!({"course_id": "c-1", "user_id": "u-1"}))));
        assert!(!filter.matches(&doc(json!({"course_id": "c-1", "user_id": "u-2"}))));
        assert!(!filter.matches(&doc(json!({"course_id": "c-1"}))));
        assert!(Filter::new().matches(&doc(json!({}))));
    }

    #[test]
    fn test_filter_to_object() {
        let filter = Filter::new().eq("course_id", "c-1");
        assert_eq!(Value::Object(filter.to_object()), json!({"course_id": "c-1"}));
    }

    #[test]
    fn test_into_document_rejects_non_objects() {
        assert!(into_document(json!([1, 2])).is_err());
    }
}
