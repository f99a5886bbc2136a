use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::db::Entity;

/// A viewer's engagement with one course, tallied per visit
///
/// `course_category` and `view_count` may be missing in stored documents;
/// both count as zero contribution when scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CourseView {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub course_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Entity for CourseView {
    const COLLECTION: &'static str = "course_views";
}

impl CourseView {
    /// Category this record counts towards, if it names one
    pub fn category(&self) -> Option<&str> {
        self.course_category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn views(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }
}

/// Partial update applied when a viewer revisits a course
#[derive(Debug, Serialize)]
pub struct CourseViewUpdate {
    pub view_count: u64,
    pub last_accessed: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_category_is_ignored() {
        let view = CourseView {
            course_category: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(view.category(), None);
    }

    #[test]
    fn test_missing_view_count_is_zero() {
        let view: CourseView =
            serde_json::from_str(r#"{"course_id":"c-1","course_category":"AI"}"#).unwrap();
        assert_eq!(view.views(), 0);
        assert_eq!(view.category(), Some("AI"));
    }

    #[test]
    fn test_null_fields_keep_the_view_count() {
        let view: CourseView = serde_json::from_str(
            r#"{"course_id":null,"course_category":"AI","is_saved":null,"view_count":10}"#,
        )
        .unwrap();
        assert_eq!(view.views(), 10);
        assert_eq!(view.category(), Some("AI"));
        assert!(!view.is_saved);
    }

    #[test]
    fn test_integral_float_view_count() {
        let view: CourseView =
            serde_json::from_str(r#"{"course_category":"AI","view_count":2.0}"#).unwrap();
        assert_eq!(view.views(), 2);

        let view: CourseView = serde_json::from_str(r#"{"view_count":null}"#).unwrap();
        assert_eq!(view.views(), 0);
    }

    #[test]
    fn test_negative_view_count_is_rejected() {
        let result = serde_json::from_str::<CourseView>(r#"{"view_count":-3}"#);
        assert!(result.is_err());
    }
}
