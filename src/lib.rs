pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::database::pg_store::PgExamStore;
use crate::database::store::ExamStore;
use crate::middleware::auth::{require_admin, require_bearer_auth};
use crate::middleware::cors::permissive_cors;
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::services::{
    account_service::AccountService, attempt_service::AttemptService,
    catalog_service::CatalogService, report_service::ReportService,
    result_service::ResultService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub attempt_service: AttemptService,
    pub result_service: ResultService,
    pub catalog_service: CatalogService,
    pub account_service: AccountService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let store: Arc<dyn ExamStore> = Arc::new(PgExamStore::new(pool.clone()));

        Self {
            attempt_service: AttemptService::new(store.clone()),
            result_service: ResultService::new(store),
            catalog_service: CatalogService::new(pool.clone()),
            account_service: AccountService::new(pool.clone()),
            report_service: ReportService::new(pool.clone()),
            pool,
        }
    }
}

/// Full HTTP surface. Public routes and authenticated routes get separate
/// rate limiters sized from the configuration.
///
/// `/api/admin/results/:id` takes a result id while `.../:id/declare` takes
/// an attempt id; the router needs one parameter name per segment.
pub fn build_router(state: AppState) -> Router {
    let config = crate::config::get_config();

    let public = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let employee = Router::new()
        .route(
            "/api/exam/:schedule_id",
            get(routes::exam::start_exam).post(routes::exam::start_exam),
        )
        .route("/api/exam/:schedule_id/submit", post(routes::exam::submit_exam))
        .route("/api/results/:attempt_id", get(routes::exam::view_result))
        .route("/api/employee/dashboard", get(routes::employee::dashboard))
        .route_layer(from_fn(require_bearer_auth));

    let admin = Router::new()
        .route("/api/admin/dashboard", get(routes::admin::dashboard))
        .route(
            "/api/admin/technologies",
            get(routes::admin::list_technologies).post(routes::admin::create_technology),
        )
        .route(
            "/api/admin/technologies/:id",
            patch(routes::admin::update_technology).delete(routes::admin::delete_technology),
        )
        .route(
            "/api/admin/schedules",
            get(routes::admin::list_schedules).post(routes::admin::create_schedule),
        )
        .route(
            "/api/admin/schedules/:id",
            patch(routes::admin::update_schedule).delete(routes::admin::delete_schedule),
        )
        .route(
            "/api/admin/questions",
            get(routes::admin::list_questions).post(routes::admin::create_question),
        )
        .route(
            "/api/admin/questions/:id",
            patch(routes::admin::update_question).delete(routes::admin::delete_question),
        )
        .route("/api/admin/results", get(routes::admin::list_results))
        .route(
            "/api/admin/results/:id",
            get(routes::admin::get_result).patch(routes::admin::update_result),
        )
        .route(
            "/api/admin/results/:id/declare",
            post(routes::admin::declare_result),
        )
        .route("/api/admin/attempts", get(routes::admin::list_attempts))
        .route("/api/admin/attempts/:attempt_id", get(routes::admin::view_attempt))
        .route_layer(from_fn(require_admin));

    let api = Router::new()
        .merge(employee)
        .merge(admin)
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps),
            rps_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(permissive_cors())
        .with_state(state)
}
