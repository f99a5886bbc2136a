use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::db::Entity;

/// Lesson count assumed for progress records that never recorded one
pub const DEFAULT_TOTAL_LESSONS: u32 = 10;

/// A viewer's progress through one course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProgress {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub course_id: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub completed_lessons: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub time_spent_minutes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lessons: Option<u32>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub is_saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_duration: Option<String>,
}

impl Entity for UserProgress {
    const COLLECTION: &'static str = "user_progress";
}

impl UserProgress {
    pub fn completed_count(&self) -> u32 {
        self.completed_lessons.len() as u32
    }

    /// Completion percentage, rounded. Zero when the lesson total is unknown.
    pub fn percentage(&self) -> u32 {
        match self.total_lessons {
            Some(total) if total > 0 => {
                ((self.completed_count() as f64 / total as f64) * 100.0).round() as u32
            }
            _ => 0,
        }
    }

    fn effective_total(&self) -> u32 {
        self.total_lessons
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_TOTAL_LESSONS)
    }

    pub fn is_in_progress(&self) -> bool {
        let done = self.completed_count();
        done > 0 && done < self.effective_total()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_count() >= self.effective_total()
    }
}

/// Partial update for an existing progress record
#[derive(Debug, Default, Serialize)]
pub struct ProgressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_lessons: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_minutes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_saved: Option<bool>,
}
