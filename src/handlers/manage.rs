// src/handlers/manage.rs

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
        access::managed_course,
        catalog::{course_summary, lesson_outline},
    },
    models::course::{
        BulkAction, BulkCourseRequest, COURSE_SUMMARY_SELECT, CourseDetail, CourseSummary,
        CreateCourseRequest, PublishRequest, UpdateCourseRequest, blank_as_none,
    },
    utils::{html::sanitize_rich_text, jwt::Claims},
};

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !out.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            out.push(tag);
        }
    }
    out
}

/// Courses the caller manages, drafts included. Admins see every course.
#[utoipa::path(
    get,
    path = "/api/manage/courses",
    responses((status = 200, body = [CourseSummary]), (status = 403)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn list_managed_courses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let owner_filter = if claims.is_admin() { None } else { Some(claims.user_id()?) };

    let courses = sqlx::query_as::<_, CourseSummary>(&format!(
        r#"{COURSE_SUMMARY_SELECT}
        WHERE ($1::BIGINT IS NULL OR c.instructor_id = $1)
        ORDER BY c.updated_at DESC, c.id DESC
        "#
    ))
    .bind(owner_filter)
    .fetch_all(&pool)
    .await?;

    Ok(Json(courses))
}

/// Creates a draft course owned by the caller.
#[utoipa::path(
    post,
    path = "/api/manage/courses",
    request_body = CreateCourseRequest,
    responses((status = 201, body = CourseSummary), (status = 400), (status = 403)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn create_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id()?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO courses (instructor_id, title, description, category, cover_img, tags)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(payload.title.trim())
    .bind(sanitize_rich_text(&payload.description))
    .bind(payload.category.trim())
    .bind(payload.cover_img.as_deref().and_then(blank_as_none))
    .bind(SqlJson(clean_tags(payload.tags)))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(course_id = id, instructor_id = user_id, "Course created");

    let course = course_summary(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// A managed course with its lesson outline, drafts included.
#[utoipa::path(
    get,
    path = "/api/manage/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 200, body = CourseDetail), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn get_managed_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    managed_course(&pool, id, &claims).await?;

    let course = course_summary(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;
    let lessons = lesson_outline(&pool, id).await?;

    Ok(Json(CourseDetail { course, lessons }))
}

/// Updates course fields. Absent fields are left untouched.
#[utoipa::path(
    put,
    path = "/api/manage/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses((status = 200), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn update_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    managed_course(&pool, id, &claims).await?;

    if payload.is_empty() {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE courses SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(sanitize_rich_text(&description));
    }

    if let Some(category) = payload.category {
        separated.push("category = ");
        separated.push_bind_unseparated(category.trim().to_string());
    }

    if let Some(cover_img) = payload.cover_img {
        separated.push("cover_img = ");
        separated.push_bind_unseparated(blank_as_none(&cover_img));
    }

    if let Some(tags) = payload.tags {
        separated.push("tags = ");
        separated.push_bind_unseparated(SqlJson(clean_tags(tags)));
    }

    separated.push("updated_at = NOW()");

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update course: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(StatusCode::OK)
}

/// Deletes a course with its lessons, questions, attempts and enrollments.
#[utoipa::path(
    delete,
    path = "/api/manage/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 204), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn delete_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    managed_course(&pool, id, &claims).await?;

    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete course: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(course_id = id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn lesson_count(pool: &PgPool, course_id: i64) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Publishes or unpublishes a course. A course needs at least one lesson to go live.
#[utoipa::path(
    put,
    path = "/api/manage/courses/{id}/publish",
    params(("id" = i64, Path, description = "Course id")),
    request_body = PublishRequest,
    responses((status = 200), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn set_published(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    managed_course(&pool, id, &claims).await?;

    if payload.is_published && lesson_count(&pool, id).await? == 0 {
        return Err(AppError::BadRequest(
            "Add at least one lesson before publishing".to_string(),
        ));
    }

    sqlx::query("UPDATE courses SET is_published = $1, updated_at = NOW() WHERE id = $2")
        .bind(payload.is_published)
        .bind(id)
        .execute(&pool)
        .await?;

    tracing::info!(course_id = id, is_published = payload.is_published, "Course visibility changed");
    Ok(Json(serde_json::json!({ "id": id, "isPublished": payload.is_published })))
}

/// Applies publish / unpublish / delete to several courses at once.
/// Only courses the caller manages are affected; publishing skips courses without lessons.
#[utoipa::path(
    post,
    path = "/api/manage/courses/bulk",
    request_body = BulkCourseRequest,
    responses((status = 200, description = "Number of affected courses"), (status = 400), (status = 403)),
    security(("bearer" = [])),
    tag = "manage"
)]
pub async fn bulk_action(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<BulkCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let owner_filter = if claims.is_admin() { None } else { Some(claims.user_id()?) };

    let sql = match payload.action {
        BulkAction::Publish => {
            r#"
            UPDATE courses SET is_published = TRUE, updated_at = NOW()
            WHERE id = ANY($1) AND ($2::BIGINT IS NULL OR instructor_id = $2)
              AND EXISTS (SELECT 1 FROM lessons l WHERE l.course_id = courses.id)
            "#
        }
        BulkAction::Unpublish => {
            r#"
            UPDATE courses SET is_published = FALSE, updated_at = NOW()
            WHERE id = ANY($1) AND ($2::BIGINT IS NULL OR instructor_id = $2)
            "#
        }
        BulkAction::Delete => {
            r#"
            DELETE FROM courses
            WHERE id = ANY($1) AND ($2::BIGINT IS NULL OR instructor_id = $2)
            "#
        }
    };

    let affected = sqlx::query(sql)
        .bind(&payload.course_ids)
        .bind(owner_filter)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Bulk course action failed: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .rows_affected();

    tracing::info!(action = ?payload.action, requested = payload.course_ids.len(), affected, "Bulk course action");

    Ok(Json(serde_json::json!({ "affected": affected })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_tags_trims_and_dedups() {
        let tags = clean_tags(vec![" rust ".into(), "Rust".into(), "web".into()]);
        assert_eq!(tags, vec!["rust", "web"]);
    }
}
