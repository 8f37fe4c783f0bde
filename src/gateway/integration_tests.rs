//! End-to-end tests through the full router: access gate, handlers,
//! orchestrator and in-memory sinks.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use super::build_router;
use super::state::AppState;
use crate::auth::TokenService;
use crate::auth::principal::mock::MemoryPrincipalStore;
use crate::callback::CallbackIngestor;
use crate::sinks::mock::{
    CrmBehavior, LegacyBehavior, MockAnalyticsSink, MockCrmSink, MockLegacySink,
};
use crate::submission::{SubmissionOrchestrator, fixtures};

const SECRET: &str = "integration-secret";
const PRINCIPAL: i64 = 7;

struct TestApp {
    router: Router,
    tokens: Arc<TokenService>,
    principals: Arc<MemoryPrincipalStore>,
    legacy: Arc<MockLegacySink>,
    crm: Arc<MockCrmSink>,
    analytics: Arc<MockAnalyticsSink>,
}

impl TestApp {
    fn new(legacy: LegacyBehavior, crm: CrmBehavior) -> Self {
        let tokens = Arc::new(TokenService::new(SECRET, Duration::minutes(60)));
        let principals = Arc::new(MemoryPrincipalStore::new());
        principals.insert(PRINCIPAL, "site@dealer.example", "s3cret-pass");

        let legacy = Arc::new(MockLegacySink::new(legacy));
        let crm = Arc::new(MockCrmSink::new(crm));
        let analytics = Arc::new(MockAnalyticsSink::new());

        let orchestrator = Arc::new(SubmissionOrchestrator::new(
            legacy.clone(),
            crm.clone(),
            analytics.clone(),
        ));
        let callbacks = Arc::new(CallbackIngestor::new(analytics.clone()));
        let state = Arc::new(AppState::new(
            tokens.clone(),
            principals.clone(),
            orchestrator,
            callbacks,
            analytics.clone(),
        ));

        Self {
            router: build_router(state),
            tokens,
            principals,
            legacy,
            crm,
            analytics,
        }
    }

    fn token(&self) -> String {
        self.tokens.issue(PRINCIPAL).unwrap().token
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn sink_calls(&self) -> (usize, usize, usize) {
        (
            self.legacy.call_count(),
            self.crm.call_count(),
            self.analytics.call_count(),
        )
    }
}

fn booking_json() -> Value {
    serde_json::to_value(fixtures::booking()).unwrap()
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_issues_working_token() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let (status, body) = app
        .post(
            "/authentication",
            None,
            json!({"email": "site@dealer.example", "password": "s3cret-pass"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert!(body["exp"].as_str().is_some());

    let (status, _) = app
        .post("/auth/requestbooking", Some(&token), booking_json())
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let (status, body) = app
        .post(
            "/authentication",
            None,
            json!({"email": "site@dealer.example", "password": "nope"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let (status, _) = app
        .post("/authentication", None, json!({"email": 42}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Access gate
// ============================================================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let (status, _) = app.post("/auth/requestbooking", None, booking_json()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.sink_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_expired_token_rejected_even_for_existing_principal() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let stale = app
        .tokens
        .issue_at(PRINCIPAL, Utc::now() - Duration::minutes(120))
        .unwrap()
        .token;

    let (status, body) = app
        .post("/auth/requestbooking", Some(&stale), booking_json())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");
    assert_eq!(app.principals.lookup_count(), 0);
    assert_eq!(app.sink_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_valid_token_rechecks_principal_once() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    let (status, _) = app
        .post("/auth/requestbooking", Some(&token), booking_json())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.principals.lookup_count(), 1);
}

#[tokio::test]
async fn test_removed_principal_is_unauthorized() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    app.principals.remove(PRINCIPAL);

    let (status, body) = app
        .post("/auth/requestform", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(app.sink_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_foreign_token_rejected() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let foreign = TokenService::new("another-secret", Duration::minutes(60))
        .issue(PRINCIPAL)
        .unwrap()
        .token;
    let (status, body) = app
        .post("/auth/requeststatus", Some(&foreign), json!({"Data": []}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_SIGNATURE_INVALID");
}

#[tokio::test]
async fn test_open_routes_need_no_token() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_unavailable_store() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    app.analytics.set_fail(true);
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

// ============================================================================
// Booking
// ============================================================================

#[tokio::test]
async fn test_booking_all_ok() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    let (status, body) = app
        .post("/auth/requestbooking", Some(&token), booking_json())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["legacy"]["status"], "Ok");
    assert_eq!(body["crm"]["status"], "Ok");
    assert_eq!(app.sink_calls(), (1, 1, 1));
}

#[tokio::test]
async fn test_booking_missing_field_touches_no_sink() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    let mut booking = booking_json();
    booking.as_object_mut().unwrap().remove("vin");

    let (status, body) = app
        .post("/auth/requestbooking", Some(&token), booking)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(body["violations"][0]["field"], "vin");
    assert_eq!(app.sink_calls(), (0, 0, 0));
}

#[tokio::test]
async fn test_booking_legacy_unreachable() {
    let app = TestApp::new(LegacyBehavior::Unreachable, CrmBehavior::Accept);
    let token = app.token();
    let (status, body) = app
        .post("/auth/requestbooking", Some(&token), booking_json())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3002);
    assert_eq!(body["error"], "LEGACY_UNAVAILABLE");
    assert_eq!(body["legacy"]["status"], "HardFailure");
    assert!(body.get("crm").is_none());
    assert_eq!(app.sink_calls(), (1, 0, 0));
}

#[tokio::test]
async fn test_booking_legacy_rejection_still_audited() {
    let app = TestApp::new(
        LegacyBehavior::Reject("Номенклатура не найдена".into()),
        CrmBehavior::Accept,
    );
    let token = app.token();
    let (status, body) = app
        .post("/auth/requestbooking", Some(&token), booking_json())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3001);
    assert_eq!(body["error"], "SINK_FAILURE");
    assert_eq!(body["message"], "legacy: Номенклатура не найдена");
    assert_eq!(body["legacy"]["status"], "SoftFailure");
    assert_eq!(body["legacy"]["message"], "Номенклатура не найдена");
    assert_eq!(body["crm"]["status"], "Ok");
    assert_eq!(app.analytics.call_count(), 1);
}

#[tokio::test]
async fn test_booking_audit_failure_hidden() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    app.analytics.set_fail(true);
    let token = app.token();
    let (status, body) = app
        .post("/auth/requestbooking", Some(&token), booking_json())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.analytics.call_count(), 1);
    assert!(body.get("analytics").is_none());
    assert!(!body.to_string().contains("does not exist"));
}

#[tokio::test]
async fn test_booking_malformed_json() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    let request = Request::builder()
        .method("POST")
        .uri("/auth/requestbooking")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{\"request_id\": "))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.sink_calls(), (0, 0, 0));
}

// ============================================================================
// Form
// ============================================================================

#[tokio::test]
async fn test_form_crm_timeout() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::TransportError);
    let token = app.token();
    let form = serde_json::to_value(fixtures::form()).unwrap();
    let (status, body) = app.post("/auth/requestform", Some(&token), form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["crm"]["status"], "SoftFailure");
    assert!(body.get("legacy").is_none());
    assert_eq!(app.sink_calls(), (0, 1, 1));
}

// ============================================================================
// CRM callbacks
// ============================================================================

#[tokio::test]
async fn test_status_callback_writes_one_row() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    let payload = json!({"Data": [
        {"event_datetime": "2026-10-18T11:00:00"},
        {"event_name": "status_changed"},
        {"request_id": "REQ-20261018-0001"},
        {"gazcrm_client_id": "C-551"},
        {"gazcrm_worklist_id": "WL-12"},
        {"ClientID": "1660000000000000001"},
        {"metrics_type": "yandex"}
    ]});
    let (status, body) = app
        .post("/auth/requeststatus", Some(&token), payload)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Ok", "response": "data statuses received"}));
    let records = app.analytics.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].table, "gazcrm_statuses");
}

#[tokio::test]
async fn test_malformed_callback_performs_no_write() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    let token = app.token();
    let payload = json!({"Data": [
        {"event_datetime": "2026-10-18T11:00:00"},
        {"event_name": "status_changed"}
    ]});
    let (status, body) = app
        .post("/auth/requeststatus", Some(&token), payload)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "Error");
    assert_eq!(app.analytics.call_count(), 0);
}

#[tokio::test]
async fn test_callback_write_failure_reported() {
    let app = TestApp::new(LegacyBehavior::Accept, CrmBehavior::Accept);
    app.analytics.set_fail(true);
    let token = app.token();
    let payload = json!({"Data": {
        "event_datetime": "2026-10-18T11:05:00",
        "event_name": "worklist_assigned",
        "gazcrm_client_id": "C-551",
        "gazcrm_worklist_id": "WL-12"
    }});
    let (status, body) = app
        .post("/auth/requestworklist", Some(&token), payload)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": "Error", "response": "error storing callback data"})
    );
    assert!(!body.to_string().contains("does not exist"));
    assert_eq!(app.analytics.call_count(), 1);
}
