//! Route-level tests over in-memory stores and a deterministic model

use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use pw_api::middleware::{Claims, REVIEWER_ROLE};
use pw_api::{create_app, AppState};
use pw_core::repositories::{
    ChallengeStore, FraudAlertRepository, InMemoryChallengeStore, InMemoryFraudAlertRepository, InMemoryTransactionRepository,
};
use pw_core::services::{DynVerificationEngine, FraudAlertService, VerificationEngineConfig};
use pw_infra::health::HealthCheck;
use pw_infra::notification::LogNotificationSink;
use pw_infra::oracle::{FeatureScaler, LogisticModel, ModelFileScoringOracle};
use pw_shared::{AuthConfig, Environment};

const SECRET: &str = "route-test-secret";
const ALICE_EMAIL: &str = "alice@example.com";

struct Fixture {
    state: web::Data<AppState>,
    challenges: Arc<InMemoryChallengeStore>,
    sink: LogNotificationSink,
}

/// Amounts above 1000 are flagged with near certainty
fn model() -> LogisticModel {
    LogisticModel {
        scaler: FeatureScaler {
            mean: [0.0, 0.0],
            scale: [1.0, 1.0],
        },
        weights: [0.01, 0.0],
        intercept: -10.0,
        threshold: 0.5,
    }
}

/// Backend whose health is fixed at construction
struct FixedHealth(&'static str, bool);

#[async_trait]
impl HealthCheck for FixedHealth {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn is_healthy(&self) -> bool {
        self.1
    }
}

fn fixture() -> Fixture {
    fixture_with_health(Vec::new())
}

fn fixture_with_health(health_checks: Vec<Arc<dyn HealthCheck>>) -> Fixture {
    let challenges = Arc::new(InMemoryChallengeStore::new());
    let alerts = Arc::new(InMemoryFraudAlertRepository::new());
    let alert_log: Arc<dyn FraudAlertRepository> = alerts.clone();
    let sink = LogNotificationSink::new();

    let engine: Arc<DynVerificationEngine> = Arc::new(DynVerificationEngine::new(
        Arc::new(InMemoryTransactionRepository::new()),
        alerts.clone(),
        challenges.clone(),
        Arc::new(ModelFileScoringOracle::from_model(model()).unwrap()),
        Arc::new(sink.clone()),
        VerificationEngineConfig::default(),
    ));

    Fixture {
        state: web::Data::new(
            AppState::new(engine, Arc::new(FraudAlertService::new(alert_log))).with_health_checks(health_checks),
        ),
        challenges,
        sink,
    }
}

fn signed(sub: &str, email: &str, role: Option<&str>) -> (&'static str, String) {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + 600,
        role: role.map(str::to_string),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn bearer(sub: &str, email: &str) -> (&'static str, String) {
    signed(sub, email, None)
}

fn alice() -> (&'static str, String) {
    bearer("user-alice", ALICE_EMAIL)
}

fn analyst() -> (&'static str, String) {
    signed("user-analyst", "analyst@example.com", Some(REVIEWER_ROLE))
}

macro_rules! app {
    ($fixture:expr) => {
        test::init_service(create_app(
            $fixture.state.clone(),
            &AuthConfig::new(SECRET),
            Environment::Development,
        ))
        .await
    };
}

macro_rules! post {
    ($app:expr, $uri:expr, $auth:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri($uri)
            .insert_header($auth)
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! get {
    ($app:expr, $uri:expr, $auth:expr) => {{
        let req = test::TestRequest::get().uri($uri).insert_header($auth).to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

async fn live_code(challenges: &InMemoryChallengeStore) -> String {
    challenges.find(ALICE_EMAIL).await.unwrap().unwrap().code
}

#[actix_web::test]
async fn test_health_needs_no_token() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "paywatch-api");
    assert!(body.get("checks").is_none());
}

#[actix_web::test]
async fn test_health_reports_backends() {
    let f = fixture_with_health(vec![
        Arc::new(FixedHealth("mysql", true)) as Arc<dyn HealthCheck>,
        Arc::new(FixedHealth("redis", true)) as Arc<dyn HealthCheck>,
    ]);
    let app = app!(f);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["checks"]["mysql"], "up");
    assert_eq!(body["checks"]["redis"], "up");
}

#[actix_web::test]
async fn test_health_is_unavailable_when_a_backend_is_down() {
    let f = fixture_with_health(vec![
        Arc::new(FixedHealth("mysql", true)) as Arc<dyn HealthCheck>,
        Arc::new(FixedHealth("redis", false)) as Arc<dyn HealthCheck>,
    ]);
    let app = app!(f);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["redis"], "down");
}

#[actix_web::test]
async fn test_missing_or_forged_token_is_unauthorized() {
    let f = fixture();
    let app = app!(f);

    let req = test::TestRequest::post()
        .uri("/api/v1/transactions")
        .set_json(json!({"amount": 10, "time": 1}))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    let status = match resp {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = encode(
        &Header::default(),
        &Claims {
            sub: "user-alice".into(),
            email: ALICE_EMAIL.into(),
            iat: 0,
            exp: chrono::Utc::now().timestamp() + 600,
            role: Some(REVIEWER_ROLE.to_string()),
        },
        &EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/transactions/{}", Uuid::new_v4()))
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let resp = test::try_call_service(&app, req).await;
    let status = match resp {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_legitimate_transaction_is_approved_without_challenge() {
    let f = fixture();
    let app = app!(f);

    let (status, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 50, "time": 3600}));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["verdict"], "legitimate");
    assert_eq!(body["requires_2fa"], false);
    assert!(body["fraud_score"].as_f64().unwrap() < 1.0);
    assert_eq!(f.sink.get_message_count(), 0);

    let id = body["transaction_id"].as_str().unwrap();
    let (status, body) = get!(app, &format!("/api/v1/transactions/{}", id), alice());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["verified"], false);
}

#[actix_web::test]
async fn test_flagged_transaction_challenge_and_verify() {
    let f = fixture();
    let app = app!(f);

    let (status, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["requires_2fa"], true);
    assert_eq!(body["notification_sent"], true);
    assert!(body["fraud_score"].as_f64().unwrap() > 99.0);
    assert_eq!(f.sink.get_message_count(), 1);

    let tx = body["transaction_id"].as_str().unwrap().to_string();
    let (_, view) = get!(app, &format!("/api/v1/transactions/{}", tx), alice());
    assert_eq!(view["status"], "flagged");

    let code = live_code(&f.challenges).await;
    let (status, body) = post!(
        app,
        "/api/v1/verify/verify-otp",
        alice(),
        json!({"transaction_id": tx, "otp": code})
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["status"], "approved");

    let (status, body) = post!(
        app,
        "/api/v1/verify/verify-otp",
        alice(),
        json!({"transaction_id": tx, "otp": code})
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CHALLENGE_NOT_FOUND");

    let (_, view) = get!(app, &format!("/api/v1/transactions/{}", tx), alice());
    assert_eq!(view["status"], "approved");
    assert_eq!(view["verified"], true);
}

#[actix_web::test]
async fn test_wrong_code_keeps_challenge_live() {
    let f = fixture();
    let app = app!(f);

    let (_, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));
    let tx = body["transaction_id"].as_str().unwrap().to_string();
    let code = live_code(&f.challenges).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = post!(
        app,
        "/api/v1/verify/verify-otp",
        alice(),
        json!({"transaction_id": tx, "otp": wrong})
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_CODE");

    let (status, _) = post!(
        app,
        "/api/v1/verify/verify-otp",
        alice(),
        json!({"transaction_id": tx, "otp": code})
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_malformed_otp_is_invalid_input() {
    let f = fixture();
    let app = app!(f);

    let (_, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));
    let tx = body["transaction_id"].as_str().unwrap().to_string();

    for otp in ["12345", "12ab56"] {
        let (status, body) = post!(
            app,
            "/api/v1/verify/verify-otp",
            alice(),
            json!({"transaction_id": tx, "otp": otp})
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
    }

    assert!(f.challenges.find(ALICE_EMAIL).await.unwrap().unwrap().consumed_at.is_none());
}

#[actix_web::test]
async fn test_non_numeric_amount_is_rejected_without_side_effects() {
    let f = fixture();
    let app = app!(f);

    let (status, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": "lots", "time": 10}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
    assert_eq!(body["details"]["field"], "amount");

    let (status, body) = post!(app, "/api/v1/transactions", alice(), json!({"time": 10}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, body) = get!(app, "/api/v1/alerts/pending", analyst());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_other_identity_is_forbidden() {
    let f = fixture();
    let app = app!(f);

    let (_, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));
    let tx = body["transaction_id"].as_str().unwrap().to_string();
    let mallory = bearer("user-mallory", "mallory@example.com");

    let (status, body) = get!(app, &format!("/api/v1/transactions/{}", tx), mallory.clone());
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = post!(
        app,
        "/api/v1/verify/verify-otp",
        mallory,
        json!({"transaction_id": tx, "otp": "123456"})
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get!(app, &format!("/api/v1/transactions/{}", Uuid::new_v4()), alice());
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, body) = get!(app, "/api/v1/transactions/not-a-uuid", alice());
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_web::test]
async fn test_resend_replaces_code() {
    let f = fixture();
    let app = app!(f);

    let (_, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 50, "time": 10}));
    let legit = body["transaction_id"].as_str().unwrap().to_string();
    let (status, body) = post!(app, "/api/v1/verify/resend-otp", alice(), json!({"transaction_id": legit}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (_, body) = post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));
    let tx = body["transaction_id"].as_str().unwrap().to_string();
    let first = f.challenges.find(ALICE_EMAIL).await.unwrap().unwrap().created_at;

    let (status, body) = post!(app, "/api/v1/verify/resend-otp", alice(), json!({"transaction_id": tx}));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], true);
    assert_eq!(f.sink.get_message_count(), 2);

    let second = f.challenges.find(ALICE_EMAIL).await.unwrap().unwrap().created_at;
    assert!(second >= first);

    let code = live_code(&f.challenges).await;
    let (status, _) = post!(
        app,
        "/api/v1/verify/verify-otp",
        alice(),
        json!({"transaction_id": tx, "otp": code})
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_alert_queue_and_review() {
    let f = fixture();
    let app = app!(f);

    post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));

    let (status, body) = get!(app, "/api/v1/alerts/pending?limit=10", analyst());
    assert_eq!(status, StatusCode::OK);
    let alerts = body.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["status"], "pending");
    assert_eq!(alerts[0]["severity"], "critical");
    let alert_id = alerts[0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/alerts/{}/review", alert_id);
    let (status, body) = post!(app, &uri, analyst(), json!({}));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reviewed");
    assert_eq!(body["reviewed_by"], "analyst@example.com");

    let (status, body) = post!(app, &uri, analyst(), json!({}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (_, body) = get!(app, "/api/v1/alerts/pending", analyst());
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_alert_queue_requires_reviewer_role() {
    let f = fixture();
    let app = app!(f);

    post!(app, "/api/v1/transactions", alice(), json!({"amount": 5000, "time": 10}));
    let (_, body) = get!(app, "/api/v1/alerts/pending", analyst());
    let alert_id = body[0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/alerts/{}/review", alert_id);

    let mallory = bearer("user-mallory", "mallory@example.com");
    let (status, body) = get!(app, "/api/v1/alerts/pending", mallory.clone());
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
    assert!(body.get("alerts").is_none());

    let (status, body) = post!(app, &uri, mallory, json!({}));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = post!(app, &uri, alice(), json!({}));
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = get!(app, "/api/v1/alerts/pending", analyst());
    assert_eq!(body[0]["status"], "pending");
}

#[actix_web::test]
async fn test_reviewer_cannot_clear_own_alert() {
    let f = fixture();
    let app = app!(f);

    let analyst_alice = signed("user-alice", ALICE_EMAIL, Some(REVIEWER_ROLE));
    post!(app, "/api/v1/transactions", analyst_alice.clone(), json!({"amount": 5000, "time": 10}));
    let (_, body) = get!(app, "/api/v1/alerts/pending", analyst_alice.clone());
    let alert_id = body[0]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/alerts/{}/review", alert_id);
    let (status, body) = post!(app, &uri, analyst_alice, json!({}));
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, body) = post!(app, &uri, analyst(), json!({}));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviewed_by"], "analyst@example.com");
}
