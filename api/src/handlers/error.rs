//! Mapping from domain errors to HTTP responses
//!
//! Every failing endpoint answers with the same `{error, message, timestamp}`
//! envelope. Expired, consumed and missing challenges share a single code so a
//! caller cannot tell them apart.

use actix_web::{
    error::{InternalError, JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use pw_core::errors::DomainError;
use pw_shared::ErrorResponse;

/// Status code for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::InvalidInput { .. }
        | DomainError::ChallengeNotFound
        | DomainError::InvalidCode => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::OracleUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::NotificationFailed { .. } => StatusCode::BAD_GATEWAY,
        DomainError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message. Internal details of storage and collaborator
/// failures stay in the logs.
fn public_message(error: &DomainError) -> String {
    match error {
        DomainError::InvalidInput { .. } | DomainError::NotFound { .. } => error.to_string(),
        DomainError::Forbidden => "You do not have access to this resource".to_string(),
        DomainError::ChallengeNotFound => {
            "No active verification code. Request a new one".to_string()
        }
        DomainError::InvalidCode => "Invalid verification code".to_string(),
        DomainError::OracleUnavailable { .. } => {
            "Fraud scoring is temporarily unavailable. Please try again later".to_string()
        }
        DomainError::NotificationFailed { .. } => {
            "Could not deliver the verification code".to_string()
        }
        DomainError::Storage { .. } => "An internal error occurred".to_string(),
    }
}

/// Build the envelope for an arbitrary status and code
pub fn error_response(status: StatusCode, code: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse::new(code, message))
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(code = error.code(), error = %error, "Request failed");
    } else {
        tracing::debug!(code = error.code(), error = %error, "Request rejected");
    }

    let mut body = ErrorResponse::new(error.code(), public_message(&error));
    if let DomainError::InvalidInput { field, .. } = &error {
        body = body.with_detail("field", serde_json::json!(field));
    }
    HttpResponse::build(status).json(body)
}

/// Malformed JSON bodies get the same envelope as domain validation errors
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(StatusCode::BAD_REQUEST, "INVALID_INPUT", format!("Invalid request body: {}", err));
    InternalError::from_response(err, response).into()
}

/// Unparseable path segments (e.g. a transaction id that is not a UUID)
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(StatusCode::BAD_REQUEST, "INVALID_INPUT", format!("Invalid path parameter: {}", err));
    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = error_response(StatusCode::BAD_REQUEST, "INVALID_INPUT", format!("Invalid query string: {}", err));
    InternalError::from_response(err, response).into()
}
