// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    error::AppError,
    models::course::{COURSE_SUMMARY_SELECT, CatalogParams, CourseDetail, CourseSummary, LessonOutline},
    utils::search::{contains_pattern, page_limit},
};

/// Lists published courses, optionally filtered by category and title keyword.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CatalogParams),
    responses((status = 200, body = [CourseSummary])),
    tag = "catalog"
)]
pub async fn list_courses(
    State(pool): State<PgPool>,
    Query(params): Query<CatalogParams>,
) -> Result<impl IntoResponse, AppError> {
    let search_pattern = contains_pattern(params.q.as_deref());
    let category = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let limit = page_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    let courses = sqlx::query_as::<_, CourseSummary>(&format!(
        r#"{COURSE_SUMMARY_SELECT}
        WHERE c.is_published = TRUE
          AND ($1::TEXT IS NULL OR c.category = $1)
          AND ($2::TEXT IS NULL OR c.title ILIKE $2)
        ORDER BY c.created_at DESC, c.id DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(category)
    .bind(search_pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(courses))
}

/// Loads the ordered lesson outline of a course (titles only, no content).
pub async fn lesson_outline(pool: &PgPool, course_id: i64) -> Result<Vec<LessonOutline>, AppError> {
    let lessons = sqlx::query_as::<_, LessonOutline>(
        r#"
        SELECT id, title, lesson_type, duration_minutes, position
        FROM lessons
        WHERE course_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(lessons)
}

pub async fn course_summary(pool: &PgPool, course_id: i64) -> Result<Option<CourseSummary>, AppError> {
    let summary = sqlx::query_as::<_, CourseSummary>(&format!(
        "{COURSE_SUMMARY_SELECT} WHERE c.id = $1"
    ))
    .bind(course_id)
    .fetch_optional(pool)
    .await?;
    Ok(summary)
}

/// Retrieves a published course with its lesson outline.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 200, body = CourseDetail), (status = 404)),
    tag = "catalog"
)]
pub async fn get_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = course_summary(&pool, id)
        .await?
        .filter(|c| c.is_published)
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let lessons = lesson_outline(&pool, id).await?;

    Ok(Json(CourseDetail { course, lessons }))
}
