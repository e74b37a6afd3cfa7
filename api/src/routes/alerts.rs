use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::dto::{AlertResponse, PendingAlertsQuery};
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/alerts/pending
///
/// Reviewer role only.
pub async fn pending_alerts(
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<PendingAlertsQuery>,
) -> HttpResponse {
    if let Err(error) = auth.require_reviewer() {
        return handle_domain_error(error);
    }

    match state.alerts.pending(query.limit()).await {
        Ok(alerts) => {
            let body: Vec<AlertResponse> = alerts.into_iter().map(AlertResponse::from).collect();
            HttpResponse::Ok().json(body)
        }
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/alerts/{id}/review
///
/// Marks the alert reviewed by the caller, who must hold the reviewer role and
/// must not own the flagged transaction. The transaction is left untouched.
pub async fn review_alert(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> HttpResponse {
    if let Err(error) = auth.require_reviewer() {
        return handle_domain_error(error);
    }

    match state.alerts.review(path.into_inner(), &auth.identity).await {
        Ok(alert) => HttpResponse::Ok().json(AlertResponse::from(alert)),
        Err(error) => handle_domain_error(error),
    }
}
