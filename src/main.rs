//! Booking gateway entry point
//!
//! ```text
//!                 ┌─────────────┐    ┌──────────────┐    ┌──────────────┐
//!  site ──HTTP──▶ │ Access gate │───▶│ Orchestrator │───▶│ Legacy store │
//!                 └─────────────┘    └──────────────┘    ├──────────────┤
//!                        │                   │           │     CRM      │
//!  CRM ───HTTP──────────▶│──▶ Callback ──────┴──────────▶├──────────────┤
//!                                 ingestor               │ Audit store  │
//!                                                        └──────────────┘
//! ```
//!
//! Usage: `booking_gateway [--env dev] [--port 8080]`

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use booking_gateway::auth::{PgPrincipalStore, TokenService};
use booking_gateway::callback::CallbackIngestor;
use booking_gateway::config::AppConfig;
use booking_gateway::db::LazyPool;
use booking_gateway::gateway::{self, state::AppState};
use booking_gateway::sinks::{HttpCrmSink, PgAnalyticsSink, SqlLegacySink};
use booking_gateway::submission::SubmissionOrchestrator;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = booking_gateway::logging::init_logging(&app_config);

    tracing::info!(
        git_hash = env!("GIT_HASH"),
        "Starting booking gateway in {} mode",
        env
    );

    // Pools connect on first use
    let analytics_pool = Arc::new(LazyPool::new("analytics", app_config.analytics.clone()));
    let legacy_pool = Arc::new(LazyPool::new("legacy", app_config.legacy.database.clone()));

    let legacy = Arc::new(
        SqlLegacySink::new(legacy_pool, &app_config.legacy.procedure)
            .context("legacy store configuration")?
            .with_timeout(Duration::from_secs(app_config.legacy.timeout_secs)),
    );
    let crm = Arc::new(HttpCrmSink::new(&app_config.crm).context("CRM client")?);
    let analytics = Arc::new(PgAnalyticsSink::new(analytics_pool.clone()));

    let orchestrator = Arc::new(SubmissionOrchestrator::new(
        legacy,
        crm,
        analytics.clone(),
    ));
    let callbacks = Arc::new(CallbackIngestor::new(analytics.clone()));

    let tokens = Arc::new(TokenService::new(
        &app_config.auth.jwt_secret,
        chrono::Duration::minutes(app_config.auth.token_lifetime_minutes),
    ));
    let principals = Arc::new(PgPrincipalStore::new(analytics_pool));

    let state = Arc::new(AppState::new(
        tokens,
        principals,
        orchestrator,
        callbacks,
        analytics,
    ));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
