use serde::{Deserialize, Serialize};

use super::lenient;
use crate::db::Entity;

/// A course in the catalog
///
/// Every field except `id` defaults when the stored document omits it, so a
/// partially populated record still decodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Course {
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub category: String,
    /// Human readable length, e.g. "12 weeks"
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub cohort_start: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub partner: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_popular: bool,
}

impl Entity for Course {
    const COLLECTION: &'static str = "courses";
}

impl Course {
    /// Case-insensitive match of `query` against the title or category
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.category.to_lowercase().contains(&query)
    }
}

/// Payload for adding a course to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    /// Optional explicit id; generated by the store when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub cohort_start: String,
    #[serde(default)]
    pub partner: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_popular: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_decodes_with_missing_fields() {
        let course: Course = serde_json::from_str(r#"{"id":"c-1","title":"Intro to AI"}"#).unwrap();
        assert_eq!(course.id, "c-1");
        assert_eq!(course.category, "");
        assert!(!course.is_popular);
    }

    #[test]
    fn test_course_decodes_with_null_fields() {
        let course: Course = serde_json::from_str(
            r#"{"id":"c-2","category":null,"partner":null,"is_popular":true}"#,
        )
        .unwrap();
        assert_eq!(course.category, "");
        assert_eq!(course.partner, "");
        assert!(course.is_popular);
    }

    #[test]
    fn test_matches_search_on_title_and_category() {
        let course = Course {
            id: "c-1".to_string(),
            title: "Machine Learning Foundations".to_string(),
            category: "AI".to_string(),
            ..Default::default()
        };
        assert!(course.matches_search("learning"));
        assert!(course.matches_search("ai"));
        assert!(!course.matches_search("cloud"));
    }
}
