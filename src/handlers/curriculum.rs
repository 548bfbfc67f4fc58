// src/handlers/curriculum.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{
        access::{managed_course, managed_lesson},
        lesson::load_questions,
    },
    models::{
        course::blank_as_none,
        lesson::{CreateLessonRequest, LESSON_COLUMNS, Lesson, UpdateLessonRequest},
        question::{
            CreateQuestionRequest, QUESTION_COLUMNS, QuestionResponse, QuizQuestion,
            UpdateQuestionRequest, check_answer_key,
        },
    },
    utils::{html::sanitize_rich_text, jwt::Claims},
};

async fn touch_course(pool: &PgPool, course_id: i64) -> Result<(), AppError> {
    sqlx::query("UPDATE courses SET updated_at = NOW() WHERE id = $1")
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Adds a lesson to a course. Without an explicit position it goes last.
#[utoipa::path(
    post,
    path = "/api/manage/courses/{id}/lessons",
    params(("id" = i64, Path, description = "Course id")),
    request_body = CreateLessonRequest,
    responses((status = 201, body = Lesson), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn create_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    managed_course(&pool, course_id, &claims).await?;

    let lesson = sqlx::query_as::<_, Lesson>(&format!(
        r#"
        INSERT INTO lessons
        (course_id, title, lesson_type, content, video_url, duration_minutes, position, pass_score, points_reward)
        VALUES (
            $1, $2, $3, $4, $5, $6,
            COALESCE($7, (SELECT COALESCE(MAX(position) + 1, 0) FROM lessons WHERE course_id = $1)),
            COALESCE($8, 70),
            COALESCE($9, 10)
        )
        RETURNING {LESSON_COLUMNS}
        "#
    ))
    .bind(course_id)
    .bind(payload.title.trim())
    .bind(&payload.lesson_type)
    .bind(sanitize_rich_text(&payload.content))
    .bind(payload.video_url.as_deref().and_then(blank_as_none))
    .bind(payload.duration_minutes)
    .bind(payload.position)
    .bind(payload.pass_score)
    .bind(payload.points_reward)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create lesson: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    touch_course(&pool, course_id).await?;
    tracing::info!(course_id, lesson_id = lesson.id, "Lesson created");

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Updates a lesson. Absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/manage/lessons/{id}",
    params(("id" = i64, Path, description = "Lesson id")),
    request_body = UpdateLessonRequest,
    responses((status = 200, body = Lesson), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn update_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let lesson = managed_lesson(&pool, id, &claims).await?;

    if payload.is_empty() {
        return Ok(Json(lesson));
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE lessons SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    if let Some(lesson_type) = payload.lesson_type {
        separated.push("lesson_type = ");
        separated.push_bind_unseparated(lesson_type);
    }

    if let Some(content) = payload.content {
        separated.push("content = ");
        separated.push_bind_unseparated(sanitize_rich_text(&content));
    }

    if let Some(video_url) = payload.video_url {
        separated.push("video_url = ");
        separated.push_bind_unseparated(blank_as_none(&video_url));
    }

    if let Some(duration) = payload.duration_minutes {
        separated.push("duration_minutes = ");
        separated.push_bind_unseparated(duration);
    }

    if let Some(position) = payload.position {
        separated.push("position = ");
        separated.push_bind_unseparated(position);
    }

    if let Some(pass_score) = payload.pass_score {
        separated.push("pass_score = ");
        separated.push_bind_unseparated(pass_score);
    }

    if let Some(points_reward) = payload.points_reward {
        separated.push("points_reward = ");
        separated.push_bind_unseparated(points_reward);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {LESSON_COLUMNS}"));

    let updated = builder
        .build_query_as::<Lesson>()
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update lesson: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    touch_course(&pool, updated.course_id).await?;
    Ok(Json(updated))
}

/// Deletes a lesson together with its questions, attempts and progress rows.
#[utoipa::path(
    delete,
    path = "/api/manage/lessons/{id}",
    params(("id" = i64, Path, description = "Lesson id")),
    responses((status = 204), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn delete_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = managed_lesson(&pool, id, &claims).await?;

    sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete lesson: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    touch_course(&pool, lesson.course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// All questions of a quiz lesson, answer key included.
#[utoipa::path(
    get,
    path = "/api/manage/lessons/{id}/questions",
    params(("id" = i64, Path, description = "Lesson id")),
    responses((status = 200, body = [QuestionResponse]), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn list_managed_questions(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    managed_lesson(&pool, id, &claims).await?;

    let questions: Vec<QuestionResponse> = load_questions(&pool, id)
        .await?
        .into_iter()
        .map(|q| QuestionResponse::from_question(q, true))
        .collect();

    Ok(Json(questions))
}

/// Adds a question to a quiz lesson.
#[utoipa::path(
    post,
    path = "/api/manage/lessons/{id}/questions",
    params(("id" = i64, Path, description = "Lesson id")),
    request_body = CreateQuestionRequest,
    responses((status = 201, body = QuestionResponse), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn create_question(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(lesson_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let lesson = managed_lesson(&pool, lesson_id, &claims).await?;

    if !lesson.is_quiz() {
        return Err(AppError::BadRequest(
            "Questions can only be added to quiz lessons".to_string(),
        ));
    }

    let options: Vec<String> = payload.options.iter().map(|o| o.trim().to_string()).collect();

    let question = sqlx::query_as::<_, QuizQuestion>(&format!(
        r#"
        INSERT INTO quiz_questions (lesson_id, question, options, correct_index, position)
        VALUES (
            $1, $2, $3, $4,
            COALESCE($5, (SELECT COALESCE(MAX(position) + 1, 0) FROM quiz_questions WHERE lesson_id = $1))
        )
        RETURNING {QUESTION_COLUMNS}
        "#
    ))
    .bind(lesson_id)
    .bind(payload.question.trim())
    .bind(SqlJson(options))
    .bind(payload.correct_index)
    .bind(payload.position)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((
        StatusCode::CREATED,
        Json(QuestionResponse::from_question(question, true)),
    ))
}

async fn find_question(pool: &PgPool, id: i64) -> Result<QuizQuestion, AppError> {
    sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))
}

/// Updates a question. The resulting options / answer key pair is re-validated.
#[utoipa::path(
    put,
    path = "/api/manage/questions/{id}",
    params(("id" = i64, Path, description = "Question id")),
    request_body = UpdateQuestionRequest,
    responses((status = 200, body = QuestionResponse), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn update_question(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let existing = find_question(&pool, id).await?;
    managed_lesson(&pool, existing.lesson_id, &claims).await?;

    let options: Vec<String> = match payload.options {
        Some(options) => options.iter().map(|o| o.trim().to_string()).collect(),
        None => existing.options.0,
    };
    let correct_index = payload.correct_index.unwrap_or(existing.correct_index);

    check_answer_key(options.len(), correct_index)
        .map_err(|_| AppError::BadRequest("correctIndex must point at one of the options".to_string()))?;

    let question = sqlx::query_as::<_, QuizQuestion>(&format!(
        r#"
        UPDATE quiz_questions
        SET question = $1, options = $2, correct_index = $3, position = $4
        WHERE id = $5
        RETURNING {QUESTION_COLUMNS}
        "#
    ))
    .bind(
        payload
            .question
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.question),
    )
    .bind(SqlJson(options))
    .bind(correct_index)
    .bind(payload.position.unwrap_or(existing.position))
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(QuestionResponse::from_question(question, true)))
}

/// Deletes a quiz question by ID.
#[utoipa::path(
    delete,
    path = "/api/manage/questions/{id}",
    params(("id" = i64, Path, description = "Question id")),
    responses((status = 204), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn delete_question(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let existing = find_question(&pool, id).await?;
    managed_lesson(&pool, existing.lesson_id, &claims).await?;

    sqlx::query("DELETE FROM quiz_questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(StatusCode::NO_CONTENT)
}
