// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::course::validate_url_or_blank;

pub const LESSON_TYPES: [&str; 4] = ["video", "document", "text", "quiz"];

pub const QUIZ_LESSON: &str = "quiz";

/// Represents the 'lessons' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    /// 'video', 'document', 'text' or 'quiz'.
    pub lesson_type: String,
    /// Sanitized HTML body.
    pub content: String,
    pub video_url: Option<String>,
    pub duration_minutes: i32,
    pub position: i32,
    /// Minimum percentage for a passing attempt (quiz lessons).
    pub pass_score: i32,
    /// Points granted on the first passing attempt (quiz lessons).
    pub points_reward: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub const LESSON_COLUMNS: &str = "id, course_id, title, lesson_type, content, video_url, duration_minutes, position, pass_score, points_reward, created_at";

impl Lesson {
    pub fn is_quiz(&self) -> bool {
        self.lesson_type == QUIZ_LESSON
    }
}

/// DTO for creating a lesson inside a course.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(custom(function = validate_lesson_type))]
    pub lesson_type: String,
    #[validate(length(max = 50000))]
    #[serde(default)]
    pub content: String,
    #[validate(length(max = 500), custom(function = validate_url_or_blank))]
    pub video_url: Option<String>,
    #[validate(range(min = 0, max = 1440))]
    #[serde(default)]
    pub duration_minutes: i32,
    /// Appended after the last lesson when omitted.
    pub position: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub pass_score: Option<i32>,
    #[validate(range(min = 0, max = 10000))]
    pub points_reward: Option<i32>,
}

/// DTO for updating a lesson. Fields are optional.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: Option<String>,
    #[validate(custom(function = validate_lesson_type))]
    pub lesson_type: Option<String>,
    #[validate(length(max = 50000))]
    pub content: Option<String>,
    #[validate(length(max = 500), custom(function = validate_url_or_blank))]
    pub video_url: Option<String>,
    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub position: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub pass_score: Option<i32>,
    #[validate(range(min = 0, max = 10000))]
    pub points_reward: Option<i32>,
}

impl UpdateLessonRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.lesson_type.is_none()
            && self.content.is_none()
            && self.video_url.is_none()
            && self.duration_minutes.is_none()
            && self.position.is_none()
            && self.pass_score.is_none()
            && self.points_reward.is_none()
    }
}

/// Per-course progress for the current user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: i64,
    pub completed_lesson_ids: Vec<i64>,
    pub total_lessons: i64,
    pub progress_percent: i32,
}

/// Enrolled course row for "my courses".
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub course_id: i64,
    pub title: String,
    pub category: String,
    pub cover_img: Option<String>,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub total_lessons: i64,
    pub completed_lessons: i64,
    #[sqlx(skip)]
    pub progress_percent: i32,
}

/// Whole-number completion percentage, floored. A course without lessons is 0%.
pub fn progress_percent(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    (completed.clamp(0, total) * 100 / total) as i32
}

fn validate_lesson_type(lesson_type: &str) -> Result<(), validator::ValidationError> {
    if !LESSON_TYPES.contains(&lesson_type) {
        return Err(validator::ValidationError::new("invalid_lesson_type"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(5, 3), 100);
    }

    #[test]
    fn test_lesson_type_validation() {
        let req: CreateLessonRequest = serde_json::from_value(serde_json::json!({
            "title": "Intro",
            "lessonType": "podcast"
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateLessonRequest = serde_json::from_value(serde_json::json!({
            "title": "Checkpoint",
            "lessonType": "quiz",
            "passScore": 80,
            "pointsReward": 40
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_pass_score_bounds() {
        let req: UpdateLessonRequest = serde_json::from_value(serde_json::json!({
            "passScore": 101
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
