// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuizQuestion {
    pub id: i64,
    pub lesson_id: i64,
    pub question: String,
    /// Ordered option list, stored as a JSON array.
    pub options: Json<Vec<String>>,
    /// 0-based index into `options`.
    pub correct_index: i32,
    pub position: i32,
}

pub const QUESTION_COLUMNS: &str = "id, lesson_id, question, options, correct_index, position";

/// Question as returned to clients. `correct_index` is only filled in for
/// callers who manage the course.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: i64,
    pub lesson_id: i64,
    pub question: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<i32>,
    pub position: i32,
}

impl QuestionResponse {
    pub fn from_question(q: QuizQuestion, reveal_answer: bool) -> Self {
        Self {
            id: q.id,
            lesson_id: q.lesson_id,
            question: q.question,
            options: q.options.0,
            correct_index: reveal_answer.then_some(q.correct_index),
            position: q.position,
        }
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_answer_key))]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub correct_index: i32,
    pub position: Option<i32>,
}

/// DTO for updating a question. Options and answer key are validated
/// together against the stored row in the handler.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,
    pub correct_index: Option<i32>,
    pub position: Option<i32>,
}

pub(crate) fn validate_options(options: &[String]) -> Result<(), ValidationError> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        return Err(ValidationError::new("options_count_out_of_range"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// `correct_index` must point at one of the options.
pub fn check_answer_key(options_len: usize, correct_index: i32) -> Result<(), ValidationError> {
    if correct_index < 0 || correct_index as usize >= options_len {
        return Err(ValidationError::new("correct_index_out_of_range"));
    }
    Ok(())
}

fn validate_answer_key(req: &CreateQuestionRequest) -> Result<(), ValidationError> {
    check_answer_key(req.options.len(), req.correct_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(options: &[&str], correct_index: i32) -> CreateQuestionRequest {
        CreateQuestionRequest {
            question: "Which keyword declares an immutable binding?".into(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index,
            position: None,
        }
    }

    #[test]
    fn test_valid_question() {
        assert!(request(&["let", "var", "mut"], 0).validate().is_ok());
    }

    #[test]
    fn test_correct_index_must_be_in_range() {
        assert!(request(&["let", "var"], 2).validate().is_err());
        assert!(request(&["let", "var"], -1).validate().is_err());
    }

    #[test]
    fn test_option_count_and_content() {
        assert!(request(&["only"], 0).validate().is_err());
        assert!(request(&["let", "  "], 0).validate().is_err());
    }

    #[test]
    fn test_answer_hidden_from_learners() {
        let q = QuizQuestion {
            id: 1,
            lesson_id: 7,
            question: "2 + 2?".into(),
            options: Json(vec!["3".into(), "4".into()]),
            correct_index: 1,
            position: 0,
        };
        let public = serde_json::to_value(QuestionResponse::from_question(q.clone(), false)).unwrap();
        assert!(public.get("correctIndex").is_none());

        let full = serde_json::to_value(QuestionResponse::from_question(q, true)).unwrap();
        assert_eq!(full["correctIndex"], 1);
    }
}
