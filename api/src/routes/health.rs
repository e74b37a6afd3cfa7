use actix_web::{web, HttpResponse};
use futures_util::future::join_all;
use pw_shared::HealthResponse;
use std::time::Duration;

use crate::app::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Handler for GET /health
///
/// Reports each configured backend and answers 503 when any of them is down.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let results = join_all(state.health_checks.iter().map(|check| async move {
        let healthy = tokio::time::timeout(CHECK_TIMEOUT, check.is_healthy())
            .await
            .unwrap_or(false);
        (check.name(), healthy)
    }))
    .await;

    let body = results.into_iter().fold(
        HealthResponse::healthy("paywatch-api", env!("CARGO_PKG_VERSION")),
        |body, (name, healthy)| body.with_check(name, healthy),
    );

    if body.is_healthy() {
        HttpResponse::Ok().json(body)
    } else {
        tracing::warn!(checks = ?body.checks, event = "health_degraded", "Backend health check failed");
        HttpResponse::ServiceUnavailable().json(body)
    }
}
