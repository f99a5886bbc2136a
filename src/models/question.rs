use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::db::Entity;

/// Author name used when the asker does not identify themselves
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// A question in a course's Q&A thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub course_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub question_text: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub lesson_title: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub author_name: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub author_email: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub answers: Vec<Answer>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub upvotes: u64,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
}

impl Entity for Question {
    const COLLECTION: &'static str = "questions";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub answer_text: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub author_name: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub author_email: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub upvotes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_instructor: bool,
}

/// Who is posting; both fields are optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

impl Author {
    pub fn name(&self) -> String {
        self.author_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR)
            .to_string()
    }

    pub fn email(&self) -> String {
        self.author_email.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    #[serde(default)]
    pub lesson_title: String,
    #[serde(flatten)]
    pub author: Author,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAnswer {
    pub answer_text: String,
    #[serde(flatten)]
    pub author: Author,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswersUpdate<'a> {
    pub answers: &'a [Answer],
}

#[derive(Debug, Serialize)]
pub(crate) struct UpvotesUpdate {
    pub upvotes: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolvedUpdate {
    pub is_resolved: bool,
}
