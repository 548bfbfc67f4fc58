// src/handlers/insight.rs

use std::collections::HashMap;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        insight::{InstructorInsights, LessonFailureStat},
        quiz_attempt::FailedAttempt,
    },
    utils::{agent::recommend_for_hardest, jwt::Claims},
};

/// Groups failed attempts per lesson, hardest first.
///
/// Order: failure count descending, then lesson id ascending.
pub fn failure_stats(failed: &[FailedAttempt]) -> Vec<LessonFailureStat> {
    // lesson_id -> (title, count, score sum)
    let mut groups: HashMap<i64, (&str, usize, i64)> = HashMap::new();
    for attempt in failed {
        let entry = groups
            .entry(attempt.lesson_id)
            .or_insert((attempt.lesson_title.as_str(), 0, 0));
        entry.1 += 1;
        entry.2 += i64::from(attempt.score);
    }

    let mut stats: Vec<LessonFailureStat> = groups
        .into_iter()
        .map(|(lesson_id, (title, count, sum))| LessonFailureStat {
            lesson_id,
            lesson_title: title.to_string(),
            failed_count: count,
            average_score: (sum as f64 / count as f64 * 10.0).round() / 10.0,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.failed_count
            .cmp(&a.failed_count)
            .then(a.lesson_id.cmp(&b.lesson_id))
    });
    stats
}

pub fn build_insights(failed: &[FailedAttempt]) -> InstructorInsights {
    let lessons = failure_stats(failed);
    let hardest_lesson = lessons.first().cloned();

    InstructorInsights {
        recommendation: recommend_for_hardest(hardest_lesson.as_ref()),
        most_failed_count: hardest_lesson.as_ref().map_or(0, |s| s.failed_count),
        average_score: hardest_lesson.as_ref().map(|s| s.average_score),
        hardest_lesson,
        lessons,
    }
}

/// Hardest-lesson summary across the quizzes the caller manages (admins: all).
#[utoipa::path(
    get,
    path = "/api/ai/instructor-insights",
    responses((status = 200, body = InstructorInsights), (status = 403)),
    security(("bearer" = [])),
    tag = "insights"
)]
pub async fn instructor_insights(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let owner_filter = if claims.is_admin() { None } else { Some(claims.user_id()?) };

    let failed = sqlx::query_as::<_, FailedAttempt>(
        r#"
        SELECT qa.lesson_id, l.title AS lesson_title, qa.score
        FROM quiz_attempts qa
        JOIN lessons l ON l.id = qa.lesson_id
        JOIN courses c ON c.id = l.course_id
        WHERE qa.passed = FALSE
          AND ($1::BIGINT IS NULL OR c.instructor_id = $1)
        "#,
    )
    .bind(owner_filter)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load failed attempts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(build_insights(&failed)))
}
