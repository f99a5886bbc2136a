pub mod bookmark;
pub mod course;
pub mod engagement;
pub mod lenient;
pub mod progress;
pub mod question;

use serde::{Deserialize, Serialize};

pub use bookmark::{Bookmark, NewBookmark};
pub use course::{Course, NewCourse};
pub use engagement::{CourseView, CourseViewUpdate};
pub use progress::{ProgressUpdate, UserProgress, DEFAULT_TOTAL_LESSONS};
pub use question::{Answer, Author, NewAnswer, NewQuestion, Question};

/// Viewer id used when a request does not name one
pub const ANONYMOUS_VIEWER: &str = "anonymous";

pub(crate) fn anonymous_viewer() -> String {
    ANONYMOUS_VIEWER.to_string()
}

/// A course annotated with its recommendation score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    #[serde(flatten)]
    pub course: Course,
    pub score: u64,
}

/// Identifies the viewer on requests that act on their behalf
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerQuery {
    #[serde(default = "anonymous_viewer")]
    pub viewer_id: String,
}

/// Learner dashboard numbers for one viewer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub viewer_id: String,
    pub in_progress: usize,
    pub completed: usize,
    pub saved: usize,
    pub hours_learned: u64,
    pub favorite_category: Option<String>,
    pub category_scores: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub views: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_flattens_course() {
        let rec = Recommendation {
            course: Course {
                id: "c-1".to_string(),
                title: "Cloud Basics".to_string(),
                category: "Cloud".to_string(),
                ..Default::default()
            },
            score: 8,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], "c-1");
        assert_eq!(json["category"], "Cloud");
        assert_eq!(json["score"], 8);
    }

    #[test]
    fn test_viewer_query_defaults_to_anonymous() {
        let q: ViewerQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.viewer_id, ANONYMOUS_VIEWER);
    }
}
