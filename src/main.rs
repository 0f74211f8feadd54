use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use classroom_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::auth::{require_admin, require_bearer_auth, require_staff},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);
    app_state.auth_service.ensure_default_admin().await?;

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login));

    let authed_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/users/me", put(routes::users::update_profile))
        .route("/api/users/me/avatar", post(routes::users::upload_avatar))
        .route("/api/users/:id", get(routes::users::get_user))
        .route("/api/courses", get(routes::courses::list_courses))
        .route("/api/courses/:id", get(routes::courses::get_course))
        .route(
            "/api/courses/:id/lessons",
            get(routes::lessons::list_lessons_by_course),
        )
        .route("/api/lessons/:id", get(routes::lessons::get_lesson))
        .route(
            "/api/courses/:id/activities",
            get(routes::activities::list_activities_by_course),
        )
        .route("/api/activities/:id", get(routes::activities::get_activity))
        .route(
            "/api/activities/:id/questions",
            get(routes::activities::list_questions),
        )
        .route(
            "/api/activities/:id/attempts",
            post(routes::attempts::start_attempt),
        )
        .route("/api/attempts/mine", get(routes::attempts::my_attempts))
        .route("/api/attempts/:id", get(routes::attempts::get_attempt))
        .route(
            "/api/attempts/:id/submit",
            post(routes::attempts::submit_attempt),
        )
        .route(
            "/api/classes/:id/students",
            get(routes::classes::list_students),
        )
        .route(
            "/api/courses/:id/classes",
            get(routes::classes::list_classes_by_course),
        )
        .route(
            "/api/courses/:id/achievements",
            get(routes::achievements::list_achievements_by_course),
        )
        .route(
            "/api/achievements/mine",
            get(routes::achievements::my_awards),
        )
        .route(
            "/api/achievements/recommendations/:student_id",
            get(routes::achievements::recommendations),
        )
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/api/stats/courses/:id/progress",
            get(routes::stats::my_course_progress),
        )
        .layer(axum::middleware::from_fn(require_bearer_auth));

    let staff_api = Router::new()
        .route("/api/courses", post(routes::courses::create_course))
        .route(
            "/api/courses/:id",
            put(routes::courses::update_course).delete(routes::courses::delete_course),
        )
        .route("/api/classes", post(routes::classes::create_class))
        .route("/api/classes/:id", delete(routes::classes::delete_class))
        .route(
            "/api/classes/:id/students",
            post(routes::classes::enroll_student),
        )
        .route(
            "/api/classes/:id/students/:student_id",
            delete(routes::classes::remove_student),
        )
        .route("/api/lessons", post(routes::lessons::create_lesson))
        .route(
            "/api/lessons/:id",
            put(routes::lessons::update_lesson).delete(routes::lessons::delete_lesson),
        )
        .route(
            "/api/lessons/:id/presentation",
            post(routes::lessons::upload_presentation),
        )
        .route("/api/activities", post(routes::activities::create_activity))
        .route(
            "/api/activities/:id",
            put(routes::activities::update_activity).delete(routes::activities::delete_activity),
        )
        .route(
            "/api/activities/:id/publish",
            post(routes::activities::publish_activity),
        )
        .route(
            "/api/activities/:id/assign-week",
            post(routes::activities::assign_week),
        )
        .route(
            "/api/activities/:id/questions",
            put(routes::activities::upsert_question),
        )
        .route(
            "/api/activities/:id/questions/:question_id",
            delete(routes::activities::delete_question),
        )
        .route(
            "/api/activities/:id/attempts/all",
            get(routes::attempts::list_activity_attempts),
        )
        .route(
            "/api/attempts/:id/grade",
            post(routes::attempts::grade_attempt),
        )
        .route(
            "/api/achievements",
            post(routes::achievements::create_achievement),
        )
        .route(
            "/api/achievements/:id",
            put(routes::achievements::update_achievement)
                .delete(routes::achievements::delete_achievement),
        )
        .route(
            "/api/achievements/:id/photo",
            post(routes::achievements::upload_photo),
        )
        .route(
            "/api/achievements/:id/award/:student_id",
            post(routes::achievements::award_achievement),
        )
        .route("/api/stats/dashboard", get(routes::stats::dashboard))
        .route(
            "/api/stats/activities/:id",
            get(routes::stats::activity_stats),
        )
        .route(
            "/api/stats/courses/:id/students/:student_id",
            get(routes::stats::student_course_progress),
        )
        .layer(axum::middleware::from_fn(require_staff));

    let admin_api = Router::new()
        .route("/api/users", get(routes::users::list_users))
        .route("/api/users/:id/role", put(routes::users::change_role))
        .route(
            "/api/users/:id/deactivate",
            post(routes::users::deactivate_user),
        )
        .layer(axum::middleware::from_fn(require_admin));

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = base_routes
        .merge(public_api)
        .merge(authed_api)
        .merge(staff_api)
        .merge(admin_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(config.uploads_dir.clone()),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
