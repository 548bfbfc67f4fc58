// src/models/report.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Where an attendee stands in a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    YetToStart,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub fn from_counts(completed: i64, total: i64) -> Self {
        if completed <= 0 {
            ProgressStatus::YetToStart
        } else if completed >= total {
            ProgressStatus::Completed
        } else {
            ProgressStatus::InProgress
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::YetToStart => "yet_to_start",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }
}

/// Raw per-attendee row as read from the database.
#[derive(Debug, FromRow)]
pub struct AttendeeRow {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub completed_lessons: i64,
    pub points_earned: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeProgress {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub completed_lessons: i64,
    pub total_lessons: i64,
    pub progress_percent: i32,
    pub points_earned: i64,
    pub status: ProgressStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseReport {
    pub course_id: i64,
    pub course_title: String,
    pub total_participants: usize,
    pub yet_to_start: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub rows: Vec<AttendeeProgress>,
}

/// DTO for an instructor enrolling an existing user by email.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddAttendeeRequest {
    #[validate(email)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_counts() {
        assert_eq!(ProgressStatus::from_counts(0, 5), ProgressStatus::YetToStart);
        assert_eq!(ProgressStatus::from_counts(2, 5), ProgressStatus::InProgress);
        assert_eq!(ProgressStatus::from_counts(5, 5), ProgressStatus::Completed);
        // A course with no lessons has nothing to start.
        assert_eq!(ProgressStatus::from_counts(0, 0), ProgressStatus::YetToStart);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ProgressStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
