// src/handlers/report.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::access::managed_course,
    models::{
        lesson::progress_percent,
        report::{AttendeeProgress, AttendeeRow, CourseReport, ProgressStatus},
    },
    utils::{csv::to_csv, jwt::Claims},
};

/// Per-attendee progress for one course, ordered by enrollment date.
pub async fn attendee_progress(
    pool: &PgPool,
    course_id: i64,
) -> Result<Vec<AttendeeProgress>, AppError> {
    let total_lessons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, AttendeeRow>(
        r#"
        SELECT
            u.id AS user_id, u.name, u.email, e.enrolled_at,
            (SELECT COUNT(*)
               FROM lesson_progress lp
               JOIN lessons l ON l.id = lp.lesson_id
              WHERE l.course_id = e.course_id AND lp.user_id = u.id) AS completed_lessons,
            (SELECT COALESCE(SUM(qa.points_earned), 0)::BIGINT
               FROM quiz_attempts qa
               JOIN lessons l ON l.id = qa.lesson_id
              WHERE l.course_id = e.course_id AND qa.user_id = u.id) AS points_earned
        FROM enrollments e
        JOIN users u ON u.id = e.user_id
        WHERE e.course_id = $1
        ORDER BY e.enrolled_at, u.id
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load attendee progress: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(rows
        .into_iter()
        .map(|r| AttendeeProgress {
            user_id: r.user_id,
            name: r.name,
            email: r.email,
            enrolled_at: r.enrolled_at,
            completed_lessons: r.completed_lessons,
            total_lessons,
            progress_percent: progress_percent(r.completed_lessons, total_lessons),
            points_earned: r.points_earned,
            status: ProgressStatus::from_counts(r.completed_lessons, total_lessons),
        })
        .collect())
}

/// Rolls attendee rows up into the report's status counters.
pub fn build_report(course_id: i64, course_title: String, rows: Vec<AttendeeProgress>) -> CourseReport {
    let count = |status: ProgressStatus| rows.iter().filter(|r| r.status == status).count();

    CourseReport {
        course_id,
        course_title,
        total_participants: rows.len(),
        yet_to_start: count(ProgressStatus::YetToStart),
        in_progress: count(ProgressStatus::InProgress),
        completed: count(ProgressStatus::Completed),
        rows,
    }
}

pub const REPORT_CSV_HEADER: [&str; 9] = [
    "user_id",
    "name",
    "email",
    "enrolled_at",
    "completed_lessons",
    "total_lessons",
    "progress_percent",
    "points_earned",
    "status",
];

pub fn report_csv(rows: &[AttendeeProgress]) -> String {
    to_csv(&REPORT_CSV_HEADER, rows, |r| {
        vec![
            r.user_id.to_string(),
            r.name.clone(),
            r.email.clone(),
            r.enrolled_at.to_rfc3339(),
            r.completed_lessons.to_string(),
            r.total_lessons.to_string(),
            r.progress_percent.to_string(),
            r.points_earned.to_string(),
            r.status.as_str().to_string(),
        ]
    })
}

/// Participation report for a managed course.
#[utoipa::path(
    get,
    path = "/api/manage/courses/{id}/report",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 200, body = CourseReport), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "reporting"
)]
pub async fn course_report(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = managed_course(&pool, id, &claims).await?;
    let rows = attendee_progress(&pool, id).await?;
    Ok(Json(build_report(course.id, course.title, rows)))
}

/// Same report rows as a CSV attachment.
#[utoipa::path(
    get,
    path = "/api/manage/courses/{id}/report.csv",
    params(("id" = i64, Path, description = "Course id")),
    responses((status = 200, content_type = "text/csv", body = String), (status = 403), (status = 404)),
    security(("bearer" = [])),
    tag = "reporting"
)]
pub async fn course_report_csv(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    managed_course(&pool, id, &claims).await?;
    let rows = attendee_progress(&pool, id).await?;
    let csv = report_csv(&rows);

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"course-{}-report.csv\"",
        id
    ))
    .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(user_id: i64, name: &str, completed: i64, total: i64) -> AttendeeProgress {
        AttendeeProgress {
            user_id,
            name: name.to_string(),
            email: format!("user{}@example.com", user_id),
            enrolled_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            completed_lessons: completed,
            total_lessons: total,
            progress_percent: progress_percent(completed, total),
            points_earned: 0,
            status: ProgressStatus::from_counts(completed, total),
        }
    }

    #[test]
    fn test_build_report_counts() {
        let report = build_report(
            1,
            "Rust".into(),
            vec![row(1, "A", 0, 4), row(2, "B", 2, 4), row(3, "C", 4, 4), row(4, "D", 1, 4)],
        );
        assert_eq!(report.total_participants, 4);
        assert_eq!(report.yet_to_start, 1);
        assert_eq!(report.in_progress, 2);
        assert_eq!(report.completed, 1);
    }

    #[test]
    fn test_report_csv() {
        let csv = report_csv(&[row(7, "Doe, Jane", 2, 4)]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(REPORT_CSV_HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("7,\"Doe, Jane\",user7@example.com,2025-03-01T09:00:00+00:00,2,4,50,0,in_progress")
        );
        assert_eq!(lines.next(), None);
    }
}
