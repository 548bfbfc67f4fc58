// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::{DEFAULT_PAGE_SIZE, LEADERBOARD_SIZE, MAX_PAGE_SIZE},
    error::{AppError, is_unique_violation},
    handlers::{
        access::{find_lesson, lesson_access},
        lesson::load_questions,
    },
    models::{
        badge::{badge_for, badge_progress},
        quiz_attempt::{
            ATTEMPT_COLUMNS, AttemptListParams, QuizAttempt, SubmitQuizRequest, SubmitQuizResponse,
        },
        user::LeaderboardEntry,
    },
    utils::{jwt::Claims, search::page_limit},
};

/// Outcome of comparing submitted answers with the answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub correct_count: usize,
    pub total_questions: usize,
    /// 0-100.
    pub score: i32,
}

/// `round(100 * correct / total)` with halves rounded up. Zero questions score 0.
pub fn percentage(correct: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as i32
}

/// Compares answers positionally against the answer key.
/// Missing and `null` answers never match.
pub fn grade_answers(answers: &[Option<i32>], answer_key: &[i32]) -> Grade {
    let correct_count = answer_key
        .iter()
        .enumerate()
        .filter(|&(i, &correct)| answers.get(i).copied().flatten() == Some(correct))
        .count();

    Grade {
        correct_count,
        total_questions: answer_key.len(),
        score: percentage(correct_count, answer_key.len()),
    }
}

pub fn is_passing(score: i32, pass_score: i32) -> bool {
    score >= pass_score
}

/// Points granted by one attempt: the lesson reward on the first pass, 0 otherwise.
pub fn points_for_attempt(passed: bool, already_passed: bool, points_reward: i32) -> i32 {
    if passed && !already_passed {
        points_reward.max(0)
    } else {
        0
    }
}

/// Submits answers for a quiz lesson and scores them.
///
/// * Every submission inserts a new attempt row.
/// * Points are awarded, and the lesson marked complete, on the first pass only.
/// * The user row is locked for the duration of the check-and-award so two
///   concurrent first passes cannot both be rewarded.
#[utoipa::path(
    post,
    path = "/api/lessons/{id}/submit",
    params(("id" = i64, Path, description = "Quiz lesson id")),
    request_body = SubmitQuizRequest,
    responses(
        (status = 200, body = SubmitQuizResponse),
        (status = 400, description = "Quiz has no questions"),
        (status = 403),
        (status = 404, description = "Lesson or quiz not found")
    ),
    security(("bearer" = [])),
    tag = "quiz"
)]
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let user_id = claims.user_id()?;

    let lesson = find_lesson(&pool, lesson_id).await?;
    if !lesson.is_quiz() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }
    lesson_access(&pool, &lesson, &claims).await?;

    let answer_key: Vec<i32> = load_questions(&pool, lesson_id)
        .await?
        .iter()
        .map(|q| q.correct_index)
        .collect();

    if answer_key.is_empty() {
        return Err(AppError::BadRequest("Quiz has no questions".to_string()));
    }

    let grade = grade_answers(&req.answers, &answer_key);
    let passed = is_passing(grade.score, lesson.pass_score);

    let mut tx = pool.begin().await?;

    let mut total_points: i32 =
        sqlx::query_scalar("SELECT total_points FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

    let already_passed: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM quiz_attempts WHERE user_id = $1 AND lesson_id = $2 AND passed = TRUE)",
    )
    .bind(user_id)
    .bind(lesson_id)
    .fetch_one(&mut *tx)
    .await?;

    let points_earned = points_for_attempt(passed, already_passed, lesson.points_reward);

    let attempt = sqlx::query_as::<_, QuizAttempt>(&format!(
        r#"
        INSERT INTO quiz_attempts (user_id, lesson_id, score, passed, points_earned)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {ATTEMPT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(lesson_id)
    .bind(grade.score)
    .bind(passed)
    .bind(points_earned)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Points for this quiz were already awarded".to_string())
        } else {
            tracing::error!("Failed to insert quiz attempt: {:?}", e);
            AppError::from(e)
        }
    })?;

    if points_earned > 0 {
        total_points = sqlx::query_scalar(
            "UPDATE users SET total_points = total_points + $1 WHERE id = $2 RETURNING total_points",
        )
        .bind(points_earned)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    }

    if passed && !already_passed {
        sqlx::query(
            "INSERT INTO lesson_progress (user_id, lesson_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        user_id,
        lesson_id,
        score = grade.score,
        passed,
        points_earned,
        "Quiz attempt scored"
    );

    let badge = badge_progress(total_points);

    Ok(Json(SubmitQuizResponse {
        attempt,
        correct_count: grade.correct_count,
        total_questions: grade.total_questions,
        next_badge_progress: badge.progress_percent,
        total_points,
        badge,
    }))
}

/// The current user's attempts, newest first.
#[utoipa::path(
    get,
    path = "/api/users/me/attempts",
    params(AttemptListParams),
    responses((status = 200, body = [QuizAttempt])),
    security(("bearer" = [])),
    tag = "quiz"
)]
pub async fn list_my_attempts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<AttemptListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = page_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let attempts = sqlx::query_as::<_, QuizAttempt>(&format!(
        r#"
        SELECT {ATTEMPT_COLUMNS}
        FROM quiz_attempts
        WHERE user_id = $1 AND ($2::BIGINT IS NULL OR lesson_id = $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3
        "#
    ))
    .bind(claims.user_id()?)
    .bind(params.lesson_id)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(attempts))
}

/// Top users by total points.
#[utoipa::path(
    get,
    path = "/api/users/leaderboard",
    responses((status = 200, body = [LeaderboardEntry])),
    tag = "quiz"
)]
pub async fn get_leaderboard(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let mut leaderboard = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT id, name, total_points
        FROM users
        WHERE total_points > 0
        ORDER BY total_points DESC, id ASC
        LIMIT $1
        "#,
    )
    .bind(LEADERBOARD_SIZE)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    for entry in &mut leaderboard {
        entry.badge = badge_for(entry.total_points).map(|t| t.name.to_string());
    }

    Ok(Json(leaderboard))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks(answers: &[i32]) -> Vec<Option<i32>> {
        answers.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 4), 0);
        assert_eq!(percentage(3, 4), 75);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        // 1/8 = 12.5 rounds up
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_score_matches_formula_for_all_small_quizzes() {
        for total in 1..=30usize {
            for correct in 0..=total {
                let expected = (100.0 * correct as f64 / total as f64).round() as i32;
                assert_eq!(percentage(correct, total), expected, "{}/{}", correct, total);
            }
        }
    }

    #[test]
    fn test_grade_perfect() {
        let grade = grade_answers(&picks(&[0, 1, 2, 0]), &[0, 1, 2, 0]);
        assert_eq!(grade.correct_count, 4);
        assert_eq!(grade.total_questions, 4);
        assert_eq!(grade.score, 100);
    }

    #[test]
    fn test_short_answer_list_counts_missing_as_wrong() {
        let grade = grade_answers(&picks(&[0, 1]), &[0, 1, 2, 0]);
        assert_eq!(grade.correct_count, 2);
        assert_eq!(grade.score, 50);

        let grade = grade_answers(&[], &[0, 1]);
        assert_eq!(grade.correct_count, 0);
        assert_eq!(grade.score, 0);
    }

    #[test]
    fn test_extra_and_negative_answers_never_match() {
        let grade = grade_answers(&picks(&[-1, 1, 2, 0, 3, 3]), &[0, 1, 2, 0]);
        assert_eq!(grade.correct_count, 3);
        assert_eq!(grade.total_questions, 4);
        assert_eq!(grade.score, 75);
    }

    #[test]
    fn test_null_answers_never_match() {
        let grade = grade_answers(&[Some(0), None, Some(2), None], &[0, 1, 2, 0]);
        assert_eq!(grade.correct_count, 2);
        assert_eq!(grade.score, 50);
    }

    #[test]
    fn test_submit_request_accepts_null_entries() {
        let req: SubmitQuizRequest =
            serde_json::from_value(serde_json::json!({ "answers": [0, null, 2, 0] })).unwrap();
        assert_eq!(req.answers, vec![Some(0), None, Some(2), Some(0)]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_pass_threshold_is_inclusive() {
        assert!(is_passing(80, 80));
        assert!(!is_passing(79, 80));
        assert!(is_passing(0, 0));
    }

    #[test]
    fn test_points_awarded_once() {
        assert_eq!(points_for_attempt(true, false, 40), 40);
        assert_eq!(points_for_attempt(true, true, 40), 0);
        assert_eq!(points_for_attempt(false, false, 40), 0);
        assert_eq!(points_for_attempt(false, true, 40), 0);
    }

    /// Three submissions against a 4-question quiz (pass 80, reward 40).
    #[test]
    fn test_submission_sequence() {
        let key = [0, 1, 2, 0];
        let (pass_score, reward) = (80, 40);
        let mut already_passed = false;
        let mut total_points = 0;
        let mut outcomes = Vec::new();

        for answers in [[0, 1, 2, 0], [0, 1, 2, 1], [0, 1, 2, 0]] {
            let grade = grade_answers(&picks(&answers), &key);
            let passed = is_passing(grade.score, pass_score);
            let points = points_for_attempt(passed, already_passed, reward);
            already_passed |= passed;
            total_points += points;
            outcomes.push((grade.score, passed, points));
        }

        assert_eq!(outcomes, vec![(100, true, 40), (75, false, 0), (100, true, 0)]);
        assert_eq!(total_points, 40);
        assert_eq!(outcomes.iter().filter(|(_, _, p)| *p > 0).count(), 1);
    }
}
