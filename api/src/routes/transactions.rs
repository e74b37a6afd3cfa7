use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::dto::{CreateTransactionRequest, CreateTransactionResponse, TransactionResponse};
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/transactions
///
/// Scores the transaction and, when it is flagged, issues a challenge to the
/// caller's email. Responds `201` with the verdict and a 0-100 fraud score.
pub async fn create_transaction(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<CreateTransactionRequest>,
) -> HttpResponse {
    let (amount, time) = match request.features() {
        Ok(features) => features,
        Err(error) => return handle_domain_error(error),
    };

    match state.engine.score_and_decide(&auth.identity, amount, time).await {
        Ok(decision) => HttpResponse::Created().json(CreateTransactionResponse::from(decision)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for GET /api/v1/transactions/{id}
pub async fn get_transaction(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> HttpResponse {
    match state.engine.transaction(&auth.identity, path.into_inner()).await {
        Ok(transaction) => HttpResponse::Ok().json(TransactionResponse::from(transaction)),
        Err(error) => handle_domain_error(error),
    }
}
