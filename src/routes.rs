// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    handlers::{
        admin, attendee, auth, catalog, curriculum, enrollment, insight, lesson, manage, quiz,
        report,
    },
    openapi::ApiDoc,
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, instructor_middleware},
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Public: auth, catalog, leaderboard.
/// * Bearer token: profile, enrollment, lessons, quiz submission.
/// * INSTRUCTOR+: course management, attendees, reports, insights.
/// * ADMIN: user administration.
pub fn create_router(state: AppState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(auth_layer.clone()),
        );

    let course_routes = Router::new()
        .route("/", get(catalog::list_courses))
        .route("/{id}", get(catalog::get_course))
        .merge(
            Router::new()
                .route("/{id}/enroll", post(enrollment::enroll))
                .route("/{id}/progress", get(enrollment::course_progress))
                .layer(auth_layer.clone()),
        );

    let lesson_routes = Router::new()
        .route("/{id}", get(lesson::get_lesson))
        .route("/{id}/complete", post(lesson::complete_lesson))
        .route("/{id}/questions", get(lesson::list_questions))
        .route("/{id}/submit", post(quiz::submit_quiz))
        .layer(auth_layer.clone());

    let user_routes = Router::new()
        .route("/leaderboard", get(quiz::get_leaderboard))
        .merge(
            Router::new()
                .route("/me/courses", get(enrollment::my_courses))
                .route("/me/attempts", get(quiz::list_my_attempts))
                .layer(auth_layer.clone()),
        );

    // Auth first, then the role check (layers run outside in).
    let manage_routes = Router::new()
        .route(
            "/courses",
            get(manage::list_managed_courses).post(manage::create_course),
        )
        .route("/courses/bulk", post(manage::bulk_action))
        .route(
            "/courses/{id}",
            get(manage::get_managed_course)
                .put(manage::update_course)
                .delete(manage::delete_course),
        )
        .route("/courses/{id}/publish", put(manage::set_published))
        .route("/courses/{id}/lessons", post(curriculum::create_lesson))
        .route(
            "/courses/{id}/attendees",
            get(attendee::list_attendees).post(attendee::add_attendee),
        )
        .route(
            "/courses/{id}/attendees/{user_id}",
            delete(attendee::remove_attendee),
        )
        .route("/courses/{id}/report", get(report::course_report))
        .route("/courses/{id}/report.csv", get(report::course_report_csv))
        .route(
            "/lessons/{id}",
            put(curriculum::update_lesson).delete(curriculum::delete_lesson),
        )
        .route(
            "/lessons/{id}/questions",
            get(curriculum::list_managed_questions).post(curriculum::create_question),
        )
        .route(
            "/questions/{id}",
            put(curriculum::update_question).delete(curriculum::delete_question),
        )
        .layer(middleware::from_fn(instructor_middleware))
        .layer(auth_layer.clone());

    let ai_routes = Router::new()
        .route("/instructor-insights", get(insight::instructor_insights))
        .layer(middleware::from_fn(instructor_middleware))
        .layer(auth_layer.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/role", put(admin::update_role))
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth_layer);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/lessons", lesson_routes)
        .nest("/api/users", user_routes)
        .nest("/api/manage", manage_routes)
        .nest("/api/ai", ai_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
