//! HTTP API Layer
//!
//! REST API for the emergency claim workflow using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers per resource (alerts, claims, stays, invoices)
//! - **Middleware**: JWT authentication producing the caller's `Actor`, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: `{error, message}` bodies with stable error codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use domain_workflow::WorkflowService;

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{alerts, claims, stays, invoices, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: WorkflowService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Workflow service over the configured store
/// * `config` - API configuration
pub fn create_router(service: WorkflowService, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let alert_routes = Router::new()
        .route("/", post(alerts::raise_alert))
        .route("/:id", get(alerts::get_alert))
        .route("/:id/activate", post(alerts::activate_alert))
        .route("/:id/resolve", post(alerts::resolve_alert))
        .route("/:id/cancel", post(alerts::cancel_alert))
        .route("/:id/hospital", post(alerts::assign_hospital));

    let claim_routes = Router::new()
        .route("/", get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id/urgency-decision", post(claims::decide_urgency))
        .route("/:id/ambulance-dispatch", post(claims::dispatch_ambulance))
        .route("/:id/orientation", post(claims::orient_patient));

    let stay_routes = Router::new()
        .route("/:id/report", post(stays::submit_report))
        .route("/:id/validation", post(stays::validate_report))
        .route("/:id/invoice", post(stays::create_invoice));

    let invoice_routes = Router::new()
        .route("/", get(invoices::list_invoices))
        .route("/:id/validate-medical", post(invoices::validate_medical))
        .route("/:id/validate-sinistre", post(invoices::validate_sinistre))
        .route("/:id/validate-compta", post(invoices::validate_compta));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/alerts", alert_routes)
        .nest("/claims", claim_routes)
        .nest("/stays", stay_routes)
        .nest("/invoices", invoice_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
