//! REST API over the planner services
//!
//! Principal and role checks happen upstream; every route here assumes an
//! already-authorised caller.

use anyhow::Result;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::app::AppContext;

pub mod handlers;
pub mod response;

pub use handlers::ApiState;
pub use response::{ApiError, ApiResponse, ApiResult};

/// Build the application router
pub fn router(context: AppContext) -> Router {
    let state: ApiState = Arc::new(context);

    Router::new()
        .route("/api/health", get(handlers::health_check))
        // Directory
        .route(
            "/api/admin/assignable-patients",
            get(handlers::assignable_patients),
        )
        .route("/api/admin/patients", post(handlers::register_patient))
        .route(
            "/api/admin/patients/{patient_id}/approve",
            post(handlers::approve_patient),
        )
        .route(
            "/api/admin/patients/{patient_id}/deactivate",
            post(handlers::deactivate_patient),
        )
        // Catalog
        .route(
            "/api/admin/exercises",
            get(handlers::list_exercises).post(handlers::create_exercise),
        )
        .route(
            "/api/admin/routines",
            get(handlers::list_routines).post(handlers::create_routine),
        )
        .route(
            "/api/admin/routines/{routine_id}",
            put(handlers::update_routine).delete(handlers::delete_routine),
        )
        .route(
            "/api/admin/routines/{routine_id}/exercises",
            get(handlers::routine_exercises),
        )
        // Calendar
        .route("/api/admin/calendar/assign", post(handlers::assign))
        .route(
            "/api/admin/calendar/unassign/{assignment_id}",
            delete(handlers::unassign),
        )
        .route("/api/admin/calendar/{patient_id}", get(handlers::calendar))
        // Reports
        .route(
            "/api/admin/reports/patient/{patient_id}",
            get(handlers::patient_reports),
        )
        .route("/api/admin/reports/summary", get(handlers::report_summary))
        // Patient side
        .route("/api/patients/{patient_id}/plan", get(handlers::daily_plan))
        .route(
            "/api/patients/{patient_id}/reports/today",
            get(handlers::today_report)
                .post(handlers::submit_report)
                .put(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until the process stops
pub async fn serve(context: AppContext) -> Result<()> {
    let addr = context.config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(listener, context).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: tokio::net::TcpListener, context: AppContext) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    info!("Starting planner API server on {}", addr);
    axum::serve(listener, router(context)).await?;
    Ok(())
}
