// src/models/quiz_attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::badge::BadgeProgress;

/// Represents the 'quiz_attempts' table. Rows are never updated or deleted
/// by the scoring path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub lesson_id: i64,
    /// 0-100.
    pub score: i32,
    pub passed: bool,
    /// Non-zero on the first passing attempt only.
    pub points_earned: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub const ATTEMPT_COLUMNS: &str = "id, user_id, lesson_id, score, passed, points_earned, created_at";

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitQuizRequest {
    /// Selected option index per question, in question order.
    /// `null` marks an unanswered question.
    #[validate(length(max = 500))]
    pub answers: Vec<Option<i32>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub attempt: QuizAttempt,
    pub correct_count: usize,
    pub total_questions: usize,
    /// Percent towards the next badge after this attempt.
    pub next_badge_progress: i32,
    pub total_points: i32,
    pub badge: BadgeProgress,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttemptListParams {
    pub lesson_id: Option<i64>,
    pub limit: Option<i64>,
}

/// A failed attempt joined with its lesson title, input to instructor insights.
#[derive(Debug, Clone, FromRow)]
pub struct FailedAttempt {
    pub lesson_id: i64,
    pub lesson_title: String,
    pub score: i32,
}
