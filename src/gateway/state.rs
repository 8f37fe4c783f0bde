use std::sync::Arc;

use crate::auth::{PrincipalStore, TokenService};
use crate::callback::CallbackIngestor;
use crate::sinks::AnalyticsSink;
use crate::submission::SubmissionOrchestrator;

/// Gateway application state (shared by all handlers)
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub principals: Arc<dyn PrincipalStore>,
    pub orchestrator: Arc<SubmissionOrchestrator>,
    pub callbacks: Arc<CallbackIngestor>,
    /// Audit store, also pinged by the health check
    pub analytics: Arc<dyn AnalyticsSink>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        principals: Arc<dyn PrincipalStore>,
        orchestrator: Arc<SubmissionOrchestrator>,
        callbacks: Arc<CallbackIngestor>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            tokens,
            principals,
            orchestrator,
            callbacks,
            analytics,
        }
    }
}
