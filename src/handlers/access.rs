// src/handlers/access.rs

//! Ownership and enrollment checks shared by the handlers.

use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        course::{COURSE_COLUMNS, Course},
        lesson::{LESSON_COLUMNS, Lesson},
    },
    utils::jwt::Claims,
};

pub async fn find_course(pool: &PgPool, course_id: i64) -> Result<Course, AppError> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

pub async fn find_lesson(pool: &PgPool, lesson_id: i64) -> Result<Lesson, AppError> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
        .bind(lesson_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Lesson not found".to_string()))
}

/// The course owner and admins may manage a course.
pub fn can_manage(course: &Course, claims: &Claims) -> Result<bool, AppError> {
    Ok(claims.is_admin() || course.instructor_id == claims.user_id()?)
}

/// Loads a course and checks that the caller may manage it.
pub async fn managed_course(
    pool: &PgPool,
    course_id: i64,
    claims: &Claims,
) -> Result<Course, AppError> {
    let course = find_course(pool, course_id).await?;
    if !can_manage(&course, claims)? {
        return Err(AppError::Forbidden(
            "You are not allowed to manage this course".to_string(),
        ));
    }
    Ok(course)
}

/// Loads a lesson and checks that the caller may manage its course.
pub async fn managed_lesson(
    pool: &PgPool,
    lesson_id: i64,
    claims: &Claims,
) -> Result<Lesson, AppError> {
    let lesson = find_lesson(pool, lesson_id).await?;
    managed_course(pool, lesson.course_id, claims).await?;
    Ok(lesson)
}

pub async fn is_enrolled(pool: &PgPool, user_id: i64, course_id: i64) -> Result<bool, AppError> {
    let enrolled: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(pool)
    .await?;
    Ok(enrolled)
}

/// How the caller relates to a lesson's course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonAccess {
    Learner,
    Manager,
}

/// Enrolled learners and course managers may open a lesson; everyone else gets 403.
pub async fn lesson_access(
    pool: &PgPool,
    lesson: &Lesson,
    claims: &Claims,
) -> Result<LessonAccess, AppError> {
    let course = find_course(pool, lesson.course_id).await?;
    if can_manage(&course, claims)? {
        return Ok(LessonAccess::Manager);
    }
    if course.is_published && is_enrolled(pool, claims.user_id()?, course.id).await? {
        return Ok(LessonAccess::Learner);
    }
    Err(AppError::Forbidden(
        "Enroll in this course to access its lessons".to_string(),
    ))
}
