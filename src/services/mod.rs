pub mod bookmarks;
pub mod catalog;
pub mod dashboard;
pub mod engagement;
pub mod progress;
pub mod questions;
pub mod recommendations;

pub use recommendations::{favorite_category, recommend, recommend_with_policy, ScoringPolicy};
