// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use url::Url;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: i64,
    pub instructor_id: i64,
    pub title: String,
    /// Sanitized HTML.
    pub description: String,
    pub category: String,
    pub cover_img: Option<String>,
    /// Stored as a JSON array in the database.
    pub tags: Json<Vec<String>>,
    pub is_published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const COURSE_COLUMNS: &str = "id, instructor_id, title, description, category, cover_img, tags, is_published, created_at, updated_at";

/// Catalog / dashboard row: a course joined with its derived counts.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i64,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub cover_img: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub tags: Json<Vec<String>>,
    pub is_published: bool,
    pub lessons_count: i64,
    pub enrolled_count: i64,
    pub total_duration_minutes: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Shared SELECT for `CourseSummary`; callers append WHERE / ORDER BY.
pub const COURSE_SUMMARY_SELECT: &str = r#"
    SELECT
        c.id, c.instructor_id, u.name AS instructor_name,
        c.title, c.description, c.category, c.cover_img, c.tags, c.is_published,
        (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id) AS lessons_count,
        (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrolled_count,
        (SELECT COALESCE(SUM(l.duration_minutes), 0)::BIGINT FROM lessons l WHERE l.course_id = c.id) AS total_duration_minutes,
        c.created_at, c.updated_at
    FROM courses c
    JOIN users u ON u.id = c.instructor_id
"#;

/// Lesson entry in a course outline (no content).
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonOutline {
    pub id: i64,
    pub title: String,
    pub lesson_type: String,
    pub duration_minutes: i32,
    pub position: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseSummary,
    pub lessons: Vec<LessonOutline>,
}

/// Query parameters for the public catalog.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogParams {
    /// Keyword matched against the title.
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(max = 20000))]
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 500), custom(function = validate_url_or_blank))]
    pub cover_img: Option<String>,
    #[validate(custom(function = validate_tags))]
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for updating a course. Fields are optional.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 500), custom(function = validate_url_or_blank))]
    pub cover_img: Option<String>,
    #[validate(custom(function = validate_tags))]
    pub tags: Option<Vec<String>>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.cover_img.is_none()
            && self.tags.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub is_published: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Publish,
    Unpublish,
    Delete,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCourseRequest {
    pub action: BulkAction,
    #[validate(length(min = 1, max = 200, message = "Select between 1 and 200 courses."))]
    pub course_ids: Vec<i64>,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Like `validate_url_string`, but a blank value is accepted and clears the field.
pub(crate) fn validate_url_or_blank(url: &str) -> Result<(), validator::ValidationError> {
    if url.trim().is_empty() {
        return Ok(());
    }
    validate_url_string(url.trim())
}

/// Trimmed value, or `None` when blank.
pub fn blank_as_none(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn validate_tags(tags: &[String]) -> Result<(), validator::ValidationError> {
    if tags.len() > 20 {
        return Err(validator::ValidationError::new("too_many_tags"));
    }
    if tags.iter().any(|t| t.trim().is_empty() || t.len() > 40) {
        return Err(validator::ValidationError::new("invalid_tag"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_course_rejects_bad_cover_url() {
        let req: CreateCourseRequest = serde_json::from_value(serde_json::json!({
            "title": "Rust 101",
            "category": "Programming",
            "coverImg": "not a url"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_course_defaults() {
        let req: CreateCourseRequest = serde_json::from_value(serde_json::json!({
            "title": "Rust 101",
            "category": "Programming"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.tags.is_empty());
        assert_eq!(req.description, "");
    }

    #[test]
    fn test_bulk_request_parsing() {
        let req: BulkCourseRequest = serde_json::from_value(serde_json::json!({
            "action": "unpublish",
            "courseIds": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(req.action, BulkAction::Unpublish);
        assert!(req.validate().is_ok());

        let empty: BulkCourseRequest = serde_json::from_value(serde_json::json!({
            "action": "delete",
            "courseIds": []
        }))
        .unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_blank_cover_image_clears() {
        let req: UpdateCourseRequest =
            serde_json::from_value(serde_json::json!({ "coverImg": "  " })).unwrap();
        assert!(req.validate().is_ok());
        assert!(!req.is_empty());
        assert_eq!(req.cover_img.as_deref().and_then(blank_as_none), None);

        assert_eq!(
            blank_as_none(" https://cdn.example.com/a.png "),
            Some("https://cdn.example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_empty_update_detected() {
        let req: UpdateCourseRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
    }
}
