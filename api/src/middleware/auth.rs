//! JWT authentication middleware for protecting API endpoints.
//!
//! Tokens are issued by the identity provider and only verified here. The
//! middleware extracts the bearer token, checks the HS256 signature and
//! expiry, and injects an [`AuthContext`] carrying the caller's identity and
//! whether the token grants the reviewer role.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::{header::AUTHORIZATION, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use pw_core::domain::entities::Identity;
use pw_core::errors::{DomainError, DomainResult};
use pw_shared::AuthConfig;
use serde::{Deserialize, Serialize};
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};

use crate::handlers::error::error_response;

/// Role claim granting access to the fraud alert queue
pub const REVIEWER_ROLE: &str = "reviewer";

/// Claims carried by an identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Authenticated caller injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub reviewer: bool,
}

impl AuthContext {
    fn from_claims(claims: Claims) -> Result<Self, &'static str> {
        if claims.sub.trim().is_empty() {
            return Err("Token subject is empty");
        }
        if claims.email.trim().is_empty() {
            return Err("Token carries no email");
        }
        Ok(Self {
            reviewer: claims.role.as_deref() == Some(REVIEWER_ROLE),
            identity: Identity::new(claims.sub, claims.email),
        })
    }

    /// Fails with `Forbidden` unless the token carries the reviewer role
    pub fn require_reviewer(&self) -> DomainResult<()> {
        if self.reviewer {
            return Ok(());
        }
        tracing::warn!(
            identity_id = %self.identity.id,
            event = "reviewer_role_required",
            "Alert queue requested without the reviewer role"
        );
        Err(DomainError::Forbidden)
    }
}

struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    fn verify(&self, token: &str) -> Result<AuthContext, String> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| format!("Token verification failed: {}", e))?;
        AuthContext::from_claims(data.claims).map_err(str::to_string)
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<TokenVerifier>,
}

impl JwtAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            verifier: Arc::new(TokenVerifier::new(config)),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = Arc::clone(&self.verifier);

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => return Err(unauthorized("Missing or invalid Authorization header")),
            };

            let auth_context = match verifier.verify(&token) {
                Ok(context) => context,
                Err(reason) => {
                    tracing::debug!(reason = %reason, path = %req.path(), "Rejected bearer token");
                    return Err(unauthorized(reason));
                }
            };

            req.extensions_mut().insert(auth_context);
            service.call(req).await
        })
    }
}

fn unauthorized(message: impl ToString) -> Error {
    let message = message.to_string();
    let response = error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", &message);
    InternalError::from_response(message, response).into()
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| unauthorized("Authentication required"));

        ready(result)
    }
}
