pub mod health;
pub mod openapi;
pub mod state;
pub mod types;

#[cfg(test)]
mod integration_tests;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::access_gate;
use crate::callback::handlers as callback_handlers;
use crate::submission::handlers as submission_handlers;
use state::AppState;

/// Build the full router.
///
/// `/authentication` and `/health` are open; everything under `/auth`
/// passes the access gate first.
pub fn build_router(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        // Submissions
        .route("/requestbooking", post(submission_handlers::request_booking))
        .route("/requestform", post(submission_handlers::request_form))
        // CRM callbacks
        .route("/requestleadget", post(callback_handlers::request_lead_get))
        .route("/requestworklist", post(callback_handlers::request_work_list))
        .route("/requeststatus", post(callback_handlers::request_status))
        .layer(from_fn_with_state(state.clone(), access_gate));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/authentication", post(crate::auth::handlers::login))
        .nest("/auth", protected_routes)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway and serve until the process is stopped
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        anyhow::anyhow!("failed to bind {}: {} (port may already be in use)", addr, e)
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);
    tracing::info!("Protected API: /auth/* (bearer token required)");

    axum::serve(listener, app).await?;
    Ok(())
}
