// src/handlers/enrollment.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::access::{find_course, is_enrolled},
    models::lesson::{CourseProgress, EnrolledCourse, progress_percent},
    utils::jwt::Claims,
};

/// Enrolls the current user in a published course. Idempotent.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/enroll",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 201, description = "Enrolled"), (status = 200, description = "Already enrolled"), (status = 404)),
    security(("bearer" = [])),
    tag = "enrollment"
)]
pub async fn enroll(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let course = find_course(&pool, course_id).await?;

    if !course.is_published {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let inserted = sqlx::query(
        "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to enroll user: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .rows_affected();

    if inserted == 0 {
        return Ok((StatusCode::OK, Json(serde_json::json!({ "enrolled": true }))));
    }

    tracing::info!(user_id, course_id, "User enrolled");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "enrolled": true }))))
}

/// Courses the current user is enrolled in, with completion progress.
#[utoipa::path(
    get,
    path = "/api/users/me/courses",
    responses((status = 200, body = [EnrolledCourse])),
    security(("bearer" = [])),
    tag = "enrollment"
)]
pub async fn my_courses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut courses = sqlx::query_as::<_, EnrolledCourse>(
        r#"
        SELECT
            c.id AS course_id, c.title, c.category, c.cover_img, e.enrolled_at,
            (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS total_lessons,
            (SELECT COUNT(*)
               FROM lesson_progress lp
               JOIN lessons l ON l.id = lp.lesson_id
              WHERE l.course_id = c.id AND lp.user_id = e.user_id) AS completed_lessons
        FROM enrollments e
        JOIN courses c ON c.id = e.course_id
        WHERE e.user_id = $1
        ORDER BY e.enrolled_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    for course in &mut courses {
        course.progress_percent = progress_percent(course.completed_lessons, course.total_lessons);
    }

    Ok(Json(courses))
}

/// Completed lessons of one course for the current user.
#[utoipa::path(
    get,
    path = "/api/courses/{id}/progress",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 200, body = CourseProgress), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "enrollment"
)]
pub async fn course_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    find_course(&pool, course_id).await?;

    if !is_enrolled(&pool, user_id, course_id).await? {
        return Err(AppError::Forbidden(
            "You are not enrolled in this course".to_string(),
        ));
    }

    let completed_lesson_ids: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT lp.lesson_id
        FROM lesson_progress lp
        JOIN lessons l ON l.id = lp.lesson_id
        WHERE lp.user_id = $1 AND l.course_id = $2
        ORDER BY l.position, l.id
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let total_lessons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(&pool)
        .await?;

    let progress_percent = progress_percent(completed_lesson_ids.len() as i64, total_lessons);

    Ok(Json(CourseProgress {
        course_id,
        completed_lesson_ids,
        total_lessons,
        progress_percent,
    }))
}
