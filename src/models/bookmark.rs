use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::db::Entity;

/// A saved position inside a course, with optional notes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub course_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub course_title: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub lesson_title: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub lesson_index: u32,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Bookmark {
    const COLLECTION: &'static str = "bookmarks";
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBookmark {
    #[serde(default = "super::anonymous_viewer")]
    pub viewer_id: String,
    pub lesson_title: String,
    #[serde(default)]
    pub lesson_index: u32,
    #[serde(default)]
    pub notes: String,
}
