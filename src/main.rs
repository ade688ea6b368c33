use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tuitionhub_api::{
    config::Config, db, middleware::auth::JwtSecret, routes, services::roles::RoleService,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    RoleService::bootstrap_admins(&pool, &config.admin_principals).await?;

    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    // CORS: the configured app origin, plus localhost for development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Public site surface
        .route("/contact", get(routes::settings::get_contact_details).put(routes::settings::update_contact_details))
        .route("/logo", get(routes::logo::serve_logo).put(routes::logo::upload_logo).delete(routes::logo::delete_logo))
        // Roles
        .route("/roles/me", get(routes::roles::get_caller_role))
        .route("/roles/assign", post(routes::roles::assign_role))
        .route("/roles/{principal}", get(routes::roles::get_role))
        // Profiles
        .route("/profiles", get(routes::profiles::list_profiles).post(routes::profiles::create_profile))
        .route("/profiles/me", get(routes::profiles::get_my_profile))
        .route("/profiles/{principal}", get(routes::profiles::get_profile).put(routes::profiles::update_profile))
        .route("/profiles/{principal}/photo", get(routes::profiles::serve_photo).post(routes::profiles::upload_photo))
        // Courses
        .route("/courses", get(routes::courses::list_courses).post(routes::courses::create_course))
        .route("/courses/enrollment-status", get(routes::enrollments::courses_with_enrollment_status))
        .route("/courses/{id}", get(routes::courses::get_course).put(routes::courses::update_course).delete(routes::courses::delete_course))
        // Announcements
        .route("/announcements", get(routes::announcements::list_announcements).post(routes::announcements::create_announcement))
        .route("/announcements/{id}", put(routes::announcements::update_announcement).delete(routes::announcements::delete_announcement))
        // Enrollments
        .route("/enrollments/request", post(routes::enrollments::request_enrollment))
        .route("/enrollments/renew-request", post(routes::enrollments::request_renewal))
        .route("/enrollments/approve", post(routes::enrollments::approve_enrollment))
        .route("/enrollments/reject", post(routes::enrollments::reject_enrollment))
        .route("/enrollments/renew", post(routes::enrollments::renew_enrollment))
        .route("/enrollments/me", get(routes::enrollments::my_enrollments))
        .route("/enrollments/student/{principal}", get(routes::enrollments::enrollments_by_student))
        .route("/enrollments/course/{id}", get(routes::enrollments::enrollments_by_course))
        // Results
        .route("/results/tests", post(routes::results::create_test_result))
        .route("/results/daily", post(routes::results::post_daily_result))
        .route("/results/me", get(routes::results::my_results))
        .route("/results/student/{principal}", get(routes::results::results_by_student))
        .route("/results/course/{id}", get(routes::results::results_by_course))
        .route("/results/date/{day}", get(routes::results::results_by_date))
        // Attendance
        .route("/attendance/mark", post(routes::attendance::mark_attendance))
        .route("/attendance/toggle", post(routes::attendance::toggle_attendance))
        .route("/attendance/me", get(routes::attendance::my_attendance))
        .route("/attendance/student/{principal}", get(routes::attendance::attendance_by_student))
        .route("/attendance/student/{principal}/month/{year}/{month}", get(routes::attendance::attendance_month))
        .route("/attendance/student/{principal}/range", get(routes::attendance::attendance_range))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Global body size limit of 10 MB (covers logo and photo uploads)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("tuitionhub API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
