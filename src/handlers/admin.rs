// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::user::{USER_COLUMNS, UpdateRoleRequest, User, UserResponse},
    utils::jwt::Claims,
};

/// Lists all users in the system.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, body = [UserResponse]), (status = 403)),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users: Vec<UserResponse> = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id DESC"
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .into_iter()
    .map(UserResponse::from)
    .collect();

    Ok(Json(users))
}

/// Changes a user's role. Admins cannot demote themselves.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateRoleRequest,
    responses((status = 200, body = UserResponse), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn update_role(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.user_id()? {
        return Err(AppError::BadRequest("Cannot change your own role".to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
    ))
    .bind(payload.role.as_str())
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = id, role = %payload.role, "User role changed");
    Ok((StatusCode::OK, Json(UserResponse::from(user))))
}

/// Deletes a user by ID. Prevents deleting self.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 204), (status = 400), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn delete_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.user_id()? {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
