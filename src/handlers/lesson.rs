// src/handlers/lesson.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::access::{LessonAccess, find_lesson, lesson_access},
    models::{
        lesson::Lesson,
        question::{QUESTION_COLUMNS, QuestionResponse, QuizQuestion},
    },
    utils::jwt::Claims,
};

/// Full lesson content for enrolled learners and course managers.
#[utoipa::path(
    get,
    path = "/api/lessons/{id}",
    params(("id" = i64, Path, description = "Lesson id")),
    responses((status = 200, body = Lesson), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "lessons"
)]
pub async fn get_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = find_lesson(&pool, id).await?;
    lesson_access(&pool, &lesson, &claims).await?;
    Ok(Json(lesson))
}

/// Marks a non-quiz lesson as completed. Quiz lessons complete on their first pass.
#[utoipa::path(
    post,
    path = "/api/lessons/{id}/complete",
    params(("id" = i64, Path, description = "Lesson id")),
    responses((status = 204), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "lessons"
)]
pub async fn complete_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = find_lesson(&pool, id).await?;

    if lesson.is_quiz() {
        return Err(AppError::BadRequest(
            "Quiz lessons are completed by passing the quiz".to_string(),
        ));
    }

    if lesson_access(&pool, &lesson, &claims).await? != LessonAccess::Learner {
        return Err(AppError::BadRequest(
            "Only enrolled learners track progress".to_string(),
        ));
    }

    sqlx::query(
        "INSERT INTO lesson_progress (user_id, lesson_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(claims.user_id()?)
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record lesson progress: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Loads a lesson's questions in stored order.
pub async fn load_questions(pool: &PgPool, lesson_id: i64) -> Result<Vec<QuizQuestion>, AppError> {
    let questions = sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE lesson_id = $1 ORDER BY position, id"
    ))
    .bind(lesson_id)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

/// Lists a quiz's questions. The answer key is only included for course managers.
#[utoipa::path(
    get,
    path = "/api/lessons/{id}/questions",
    params(("id" = i64, Path, description = "Lesson id")),
    responses((status = 200, body = [QuestionResponse]), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "lessons"
)]
pub async fn list_questions(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = find_lesson(&pool, id).await?;
    if !lesson.is_quiz() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let reveal_answer = lesson_access(&pool, &lesson, &claims).await? == LessonAccess::Manager;

    let questions: Vec<QuestionResponse> = load_questions(&pool, id)
        .await?
        .into_iter()
        .map(|q| QuestionResponse::from_question(q, reveal_answer))
        .collect();

    Ok(Json(questions))
}
