//! Route handlers grouped by resource

pub mod alerts;
pub mod health;
pub mod transactions;
pub mod verify;

use actix_web::web;

/// Register the authenticated `/api/v1` routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .route("", web::post().to(transactions::create_transaction))
            .route("/{id}", web::get().to(transactions::get_transaction)),
    )
    .service(
        web::scope("/verify")
            .route("/verify-otp", web::post().to(verify::verify_otp))
            .route("/resend-otp", web::post().to(verify::resend_otp)),
    )
    .service(
        web::scope("/alerts")
            .route("/pending", web::get().to(alerts::pending_alerts))
            .route("/{id}/review", web::post().to(alerts::review_alert)),
    );
}
