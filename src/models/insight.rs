// src/models/insight.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Failure statistics for one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonFailureStat {
    pub lesson_id: i64,
    pub lesson_title: String,
    pub failed_count: usize,
    /// Mean score of the failed attempts, rounded to one decimal.
    pub average_score: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstructorInsights {
    pub hardest_lesson: Option<LessonFailureStat>,
    pub most_failed_count: usize,
    pub average_score: Option<f64>,
    pub recommendation: String,
    /// All lessons with failures, hardest first.
    pub lessons: Vec<LessonFailureStat>,
}
