// src/openapi.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::handlers::{
    admin, attendee, auth, catalog, curriculum, enrollment, insight, lesson, manage, quiz, report,
};

/// Registers the `bearer` JWT scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "LearnSphere API", description = "Course catalog, lessons, quizzes and instructor tooling"),
    paths(
        auth::register,
        auth::login,
        auth::me,
        catalog::list_courses,
        catalog::get_course,
        enrollment::enroll,
        enrollment::my_courses,
        enrollment::course_progress,
        lesson::get_lesson,
        lesson::complete_lesson,
        lesson::list_questions,
        quiz::submit_quiz,
        quiz::list_my_attempts,
        quiz::get_leaderboard,
        manage::list_managed_courses,
        manage::create_course,
        manage::get_managed_course,
        manage::update_course,
        manage::delete_course,
        manage::set_published,
        manage::bulk_action,
        curriculum::create_lesson,
        curriculum::update_lesson,
        curriculum::delete_lesson,
        curriculum::list_managed_questions,
        curriculum::create_question,
        curriculum::update_question,
        curriculum::delete_question,
        attendee::list_attendees,
        attendee::add_attendee,
        attendee::remove_attendee,
        report::course_report,
        report::course_report_csv,
        insight::instructor_insights,
        admin::list_users,
        admin::update_role,
        admin::delete_user,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Registration, login and profile"),
        (name = "catalog", description = "Published course browsing"),
        (name = "enrollment", description = "Enrollment and progress"),
        (name = "lessons", description = "Lesson consumption"),
        (name = "quiz", description = "Quiz submission, attempts and points"),
        (name = "manage", description = "Instructor course management"),
        (name = "attendees", description = "Course attendee management"),
        (name = "reporting", description = "Participation reports"),
        (name = "insights", description = "Instructor insights"),
        (name = "admin", description = "User administration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_quiz_submit() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/lessons/{id}/submit"));
        assert!(doc.paths.paths.contains_key("/api/ai/instructor-insights"));
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer"));
    }
}
