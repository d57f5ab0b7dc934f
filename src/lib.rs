//! Faculty evaluation service: accounts, catalogs, committees, rank requests
//! and scored evaluations behind a session-authenticated JSON API.

pub mod admin;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod schema;
pub mod telemetry;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use diesel::r2d2::{self, ConnectionManager, PoolError};
use diesel::PgConnection;
use std::sync::Arc;
use std::time::Duration;

use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use admin::AdminEntity;
use auth::password::PasswordPolicy;
use auth::session::{SessionConfig, SessionKeyError};
use error::ApiError;
use handlers::{
    accounts, admin as admin_handlers, auth as auth_handlers, catalogs, committees, documents,
    evaluations, health, organization, rank_histories, ranks,
};
use middleware::{metrics_middleware, request_id_middleware, session_middleware};
use telemetry::MetricsState;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub session: Arc<SessionConfig>,
    pub password_policy: PasswordPolicy,
    pub password_hash_cost: u32,
    pub metrics: MetricsState,
    pub admin_entities: Arc<Vec<AdminEntity>>,
}

impl AppState {
    /// Fails when `JWT_PRIVATE_KEY` is missing or not a valid Ed25519 key.
    pub fn new(db_pool: DbPool, config: &Config) -> Result<Self, SessionKeyError> {
        let session = SessionConfig::from_env(
            config.session.token_expiry_secs,
            config.session.issuer.clone(),
            config.session.audience.clone(),
        )?;

        let password_policy = if config.security.require_password_complexity {
            PasswordPolicy::complex(config.security.min_password_length)
        } else {
            PasswordPolicy {
                min_length: config.security.min_password_length,
                ..Default::default()
            }
        };

        Ok(Self {
            db_pool,
            session: Arc::new(session),
            password_policy,
            password_hash_cost: config.security.password_hash_cost,
            metrics: MetricsState::new(config.telemetry.metrics_enabled),
            admin_entities: Arc::new(admin::registry()),
        })
    }
}

pub fn create_router(state: AppState, config: &Config) -> Router {
    let cors = build_cors_layer(config);
    let body_limit = RequestBodyLimitLayer::new(config.server.max_body_size);

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_state = state.metrics.clone();
    let public_routes = Router::new()
        .route("/health", get(health::health_check_simple))
        .route("/health/status", get(health::health_check))
        .route("/health/ready", get(health::ready_check))
        .route("/health/live", get(health::live_check))
        .route(
            "/metrics",
            get(telemetry::metrics::metrics_handler).with_state(metrics_state),
        )
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth_handlers::get_current_account))
        .route("/auth/password", put(auth_handlers::change_password))
        .route("/accounts", get(accounts::list_accounts))
        .route(
            "/accounts/{account_id}",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route(
            "/accounts/{account_id}/deactivate",
            post(accounts::deactivate_account),
        )
        .route(
            "/accounts/{account_id}/activate",
            post(accounts::activate_account),
        )
        .merge(catalog_routes())
        .merge(committee_routes())
        .merge(rank_history_routes())
        .merge(evaluation_routes())
        .route("/admin/entities", get(admin_handlers::list_entities))
        .route("/admin/entities/{key}", get(admin_handlers::get_entity))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state);

    let docs_routes = openapi::swagger_router();

    Router::new()
        .merge(docs_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(fallback_handler)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(timeout)
        .layer(body_limit)
        .layer(cors)
}

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/catalogs/{kind}",
            get(catalogs::list_entries).post(catalogs::create_entry),
        )
        .route(
            "/catalogs/{kind}/{entry_id}",
            get(catalogs::get_entry).put(catalogs::update_entry),
        )
        .route(
            "/catalogs/{kind}/{entry_id}/deactivate",
            post(catalogs::deactivate_entry),
        )
        .route(
            "/catalogs/{kind}/{entry_id}/activate",
            post(catalogs::activate_entry),
        )
        .route(
            "/departments",
            get(organization::list_departments).post(organization::create_department),
        )
        .route(
            "/departments/{department_id}",
            get(organization::get_department).put(organization::update_department),
        )
        .route(
            "/departments/{department_id}/deactivate",
            post(organization::deactivate_department),
        )
        .route(
            "/departments/{department_id}/activate",
            post(organization::activate_department),
        )
        .route(
            "/colleges",
            get(organization::list_colleges).post(organization::create_college),
        )
        .route(
            "/colleges/{college_id}",
            get(organization::get_college).put(organization::update_college),
        )
        .route(
            "/colleges/{college_id}/deactivate",
            post(organization::deactivate_college),
        )
        .route(
            "/colleges/{college_id}/activate",
            post(organization::activate_college),
        )
        .route(
            "/sub-ranks",
            get(ranks::list_sub_ranks).post(ranks::create_sub_rank),
        )
        .route(
            "/sub-ranks/{sub_rank_id}",
            get(ranks::get_sub_rank).put(ranks::update_sub_rank),
        )
        .route(
            "/sub-ranks/{sub_rank_id}/deactivate",
            post(ranks::deactivate_sub_rank),
        )
        .route(
            "/sub-ranks/{sub_rank_id}/activate",
            post(ranks::activate_sub_rank),
        )
        .route(
            "/salary-grades",
            get(ranks::list_salary_grades).post(ranks::create_salary_grade),
        )
        .route(
            "/salary-grades/{salary_grade_id}",
            get(ranks::get_salary_grade).put(ranks::update_salary_grade),
        )
        .route(
            "/salary-grades/{salary_grade_id}/deactivate",
            post(ranks::deactivate_salary_grade),
        )
        .route(
            "/salary-grades/{salary_grade_id}/activate",
            post(ranks::activate_salary_grade),
        )
        .route(
            "/faculty-ranks",
            get(ranks::list_faculty_ranks).post(ranks::create_faculty_rank),
        )
        .route(
            "/faculty-ranks/{faculty_rank_id}",
            get(ranks::get_faculty_rank).put(ranks::update_faculty_rank),
        )
        .route(
            "/faculty-ranks/{faculty_rank_id}/deactivate",
            post(ranks::deactivate_faculty_rank),
        )
        .route(
            "/faculty-ranks/{faculty_rank_id}/activate",
            post(ranks::activate_faculty_rank),
        )
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/documents/{document_id}",
            get(documents::get_document).put(documents::update_document),
        )
        .route(
            "/documents/{document_id}/deactivate",
            post(documents::deactivate_document),
        )
        .route(
            "/documents/{document_id}/activate",
            post(documents::activate_document),
        )
}

fn committee_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/committees",
            get(committees::list_committees).post(committees::assign_committee),
        )
        .route(
            "/committees/{committee_id}",
            get(committees::get_committee).put(committees::update_committee),
        )
        .route(
            "/committees/{committee_id}/revoke",
            post(committees::revoke_committee),
        )
}

fn rank_history_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rank-histories",
            get(rank_histories::list_rank_histories).post(rank_histories::create_rank_history),
        )
        .route(
            "/rank-histories/{rank_history_id}",
            get(rank_histories::get_rank_history),
        )
        .route(
            "/rank-histories/{rank_history_id}/approve",
            post(rank_histories::approve_rank_history),
        )
        .route(
            "/rank-histories/{rank_history_id}/withdraw",
            post(rank_histories::withdraw_rank_history),
        )
}

fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/evaluations",
            get(evaluations::list_evaluations).post(evaluations::submit_evaluation),
        )
        .route("/evaluations/summary", get(evaluations::evaluation_summary))
        .route(
            "/evaluations/{evaluation_id}",
            get(evaluations::get_evaluation).put(evaluations::update_evaluation),
        )
        .route(
            "/evaluations/{evaluation_id}/deactivate",
            post(evaluations::deactivate_evaluation),
        )
}

async fn fallback_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("Not found", "NOT_FOUND")),
    )
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    use axum::http::header::HeaderName;
    use axum::http::Method;

    let is_wildcard_origin = config.cors.allowed_origins.iter().any(|o| o == "*")
        || config.cors.allowed_origins.is_empty();

    let methods: Vec<Method> = config
        .cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .cors
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    let max_age = Duration::from_secs(config.cors.max_age_secs);

    let cors = if is_wildcard_origin && config.cors.allow_credentials {
        CorsLayer::new().allow_origin(tower_http::cors::AllowOrigin::mirror_request())
    } else if is_wildcard_origin {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.cors.allow_credentials)
        .max_age(max_age)
}

pub fn create_db_pool(config: &Config) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(&config.database.url);
    r2d2::Pool::builder()
        .max_size(config.database.max_connections)
        .min_idle(Some(config.database.min_connections))
        .connection_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.database.idle_timeout_secs)))
        .build(manager)
}

/// Small pool for tests and tooling.
pub fn create_db_pool_with_url(database_url: &str) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(5)
        .min_idle(Some(1))
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
}

pub fn init_tracing(config: &Config) {
    telemetry::init_telemetry(config);
}

pub use config::Config;
