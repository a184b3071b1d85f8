//! # dispatch-api
//!
//! Development fixture server for dispatch-board.
//!
//! Serves every backend endpoint the dashboard calls over an in-memory store
//! that is reset on restart, answers optimize and routes with a canned
//! deterministic assignment, and streams change events over SSE.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod openapi;
pub mod state;

use std::time::Duration;

use axum::http::{header, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use dispatch_core::defaults::{CORS_MAX_AGE_SECS, MAX_BODY_SIZE_BYTES};

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

use handlers::{inventory, jobs, metrics, ops, system, trucks};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Every route with its middleware stack.
pub fn router(state: AppState) -> Router {
    let allowed_origins = config::parse_allowed_origins(&state.config.allowed_origins);

    Router::new()
        // Jobs
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/jobs/optimize", post(jobs::optimize_jobs))
        .route("/api/jobs/routes", post(jobs::plan_routes))
        .route(
            "/api/jobs/:id",
            get(jobs::get_job)
                .patch(jobs::update_job)
                .delete(jobs::delete_job),
        )
        .route("/api/jobs/:id/defer", post(jobs::defer_job))
        .route("/api/jobs/:id/complete", post(jobs::complete_job))
        .route("/api/jobs/:id/assign", post(jobs::assign_job))
        // Fleet
        .route(
            "/api/trucks",
            get(trucks::list_trucks).post(trucks::create_truck),
        )
        .route(
            "/api/trucks/:id",
            patch(trucks::update_truck).delete(trucks::delete_truck),
        )
        // Inventory
        .route(
            "/api/items",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route(
            "/api/items/categoriesWithItems",
            get(inventory::categories_with_items),
        )
        .route(
            "/api/items/:id",
            patch(inventory::update_item).delete(inventory::delete_item),
        )
        .route(
            "/api/categories",
            get(inventory::list_categories).post(inventory::create_category),
        )
        .route(
            "/api/categories/:id",
            patch(inventory::update_category).delete(inventory::delete_category),
        )
        // Ops & metrics
        .route("/ops/mark-3-complete", post(ops::mark_three_complete))
        .route("/ops/send-next-3", post(ops::send_next_three))
        .route("/metrics/summary", get(metrics::metrics_summary))
        // System
        .route("/health", get(system::health_check))
        .route("/openapi.json", get(system::openapi_json))
        .route("/events", get(system::sse_events))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(CORS_MAX_AGE_SECS)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE_BYTES))
        .with_state(state)
}
