// src/handlers/attendee.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{access::managed_course, auth::normalize_email, report::attendee_progress},
    models::report::{AddAttendeeRequest, AttendeeProgress},
    utils::jwt::Claims,
};

/// Learners enrolled in a managed course, with their progress.
#[utoipa::path(
    get,
    path = "/api/manage/courses/{id}/attendees",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 200, body = [AttendeeProgress]), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "attendees"
)]
pub async fn list_attendees(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    managed_course(&pool, id, &claims).await?;
    Ok(Json(attendee_progress(&pool, id).await?))
}

/// Enrolls an existing user, looked up by email. On a draft course the
/// attendee can open lessons only once the course is published.
#[utoipa::path(
    post,
    path = "/api/manage/courses/{id}/attendees",
    params(("id" = i64, Path, description = "Course id")),
    request_body = AddAttendeeRequest,
    responses((status = 201), (status = 200, description = "Already enrolled"), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "attendees"
)]
pub async fn add_attendee(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<AddAttendeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    managed_course(&pool, id, &claims).await?;

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(normalize_email(&payload.email))
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let inserted = sqlx::query(
        "INSERT INTO enrollments (user_id, course_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(id)
    .execute(&pool)
    .await?
    .rows_affected();

    let status = if inserted == 0 {
        StatusCode::OK
    } else {
        tracing::info!(course_id = id, user_id, "Attendee added");
        StatusCode::CREATED
    };

    Ok((status, Json(serde_json::json!({ "userId": user_id, "courseId": id }))))
}

/// Removes an attendee. Their attempts and points are kept.
#[utoipa::path(
    delete,
    path = "/api/manage/courses/{id}/attendees/{user_id}",
    params(
        ("id" = i64, Path, description = "Course id"),
        ("user_id" = i64, Path, description = "Attendee user id")
    ),
    responses((status = 204), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "attendees"
)]
pub async fn remove_attendee(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    managed_course(&pool, id, &claims).await?;

    let result = sqlx::query("DELETE FROM enrollments WHERE course_id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove attendee: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Attendee not found".to_string()));
    }

    tracing::info!(course_id = id, user_id, "Attendee removed");
    Ok(StatusCode::NO_CONTENT)
}
