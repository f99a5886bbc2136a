use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::AppState,
    db::{Filter, SortSpec},
    error::{AppError, AppResult},
    models::{
        question::{AnswersUpdate, ResolvedUpdate, UpvotesUpdate},
        Answer, NewAnswer, NewQuestion, Question,
    },
    services::catalog,
};

/// A course's Q&A thread, newest question first
pub async fn list_for_course(state: &AppState, course_id: &str) -> AppResult<Vec<Question>> {
    state
        .collection::<Question>()
        .filter(
            Filter::new().eq("course_id", course_id),
            Some(SortSpec::desc("created_date")),
        )
        .await
}

pub async fn ask(state: &AppState, course_id: &str, request: NewQuestion) -> AppResult<Question> {
    let text = request.question_text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("Question text is required".to_string()));
    }
    catalog::get_course(state, course_id).await?;

    let question = Question {
        id: String::new(),
        course_id: course_id.to_string(),
        question_text: text.to_string(),
        lesson_title: request.lesson_title,
        author_name: request.author.name(),
        author_email: request.author.email(),
        answers: Vec::new(),
        upvotes: 0,
        is_resolved: false,
        created_date: Some(Utc::now()),
    };

    let question = state.collection::<Question>().create(&question).await?;
    tracing::info!(question_id = %question.id, course_id = %course_id, "Question asked");

    Ok(question)
}

pub async fn answer(state: &AppState, question_id: &str, request: NewAnswer) -> AppResult<Question> {
    let text = request.answer_text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput("Answer text is required".to_string()));
    }

    let question = load(state, question_id).await?;
    let mut answers = question.answers;
    answers.push(Answer {
        id: Some(Uuid::new_v4().to_string()),
        answer_text: text.to_string(),
        author_name: request.author.name(),
        author_email: request.author.email(),
        upvotes: 0,
        created_at: Some(Utc::now()),
        is_instructor: false,
    });

    let updated = state
        .collection::<Question>()
        .update(question_id, &AnswersUpdate { answers: &answers })
        .await?;
    tracing::info!(question_id = %question_id, answers = updated.answers.len(), "Question answered");

    Ok(updated)
}

pub async fn upvote(state: &AppState, question_id: &str) -> AppResult<Question> {
    let question = load(state, question_id).await?;
    state
        .collection::<Question>()
        .update(
            question_id,
            &UpvotesUpdate {
                upvotes: question.upvotes + 1,
            },
        )
        .await
}

pub async fn resolve(state: &AppState, question_id: &str) -> AppResult<Question> {
    load(state, question_id).await?;
    let updated = state
        .collection::<Question>()
        .update(question_id, &ResolvedUpdate { is_resolved: true })
        .await?;
    tracing::info!(question_id = %question_id, "Question resolved");
    Ok(updated)
}

async fn load(state: &AppState, question_id: &str) -> AppResult<Question> {
    state
        .collection::<Question>()
        .get(question_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", question_id)))
}
