use actix_web::{web, HttpResponse};
use pw_core::errors::DomainError;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{ResendOtpRequest, ResendOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
use crate::handlers::handle_domain_error;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/verify/verify-otp
///
/// Consumes the caller's live challenge and approves the transaction.
/// Expired, used and missing codes all answer `CHALLENGE_NOT_FOUND`.
pub async fn verify_otp(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    if request.validate().is_err() {
        return handle_domain_error(DomainError::invalid_input("otp", "must be exactly 6 digits"));
    }

    let request = request.into_inner();
    match state
        .engine
        .verify(&auth.identity, request.transaction_id, &request.otp)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(VerifyOtpResponse::from(outcome)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/verify/resend-otp
///
/// Replaces the caller's challenge with a fresh code. `sent` reports whether
/// the notification went out; the new code is live either way.
pub async fn resend_otp(
    state: web::Data<AppState>,
    auth: AuthContext,
    request: web::Json<ResendOtpRequest>,
) -> HttpResponse {
    match state.engine.resend(&auth.identity, request.transaction_id).await {
        Ok(sent) => HttpResponse::Ok().json(ResendOtpResponse { sent }),
        Err(error) => handle_domain_error(error),
    }
}
