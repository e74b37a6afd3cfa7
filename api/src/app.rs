//! Application state and factory
//!
//! Holds the shared services and builds the Actix-web application around them.

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    web, App, Error, HttpResponse,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use pw_core::repositories::FraudAlertRepository;
use pw_core::services::{DynVerificationEngine, FraudAlertService};
use pw_infra::health::HealthCheck;
use pw_shared::{AuthConfig, Environment};

use crate::handlers::{error_response, json_error_handler, path_error_handler, query_error_handler};
use crate::middleware::{create_cors, JwtAuth};
use crate::routes;

/// Services shared by every worker
pub struct AppState {
    pub engine: Arc<DynVerificationEngine>,
    pub alerts: Arc<FraudAlertService<dyn FraudAlertRepository>>,
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl AppState {
    pub fn new(
        engine: Arc<DynVerificationEngine>,
        alerts: Arc<FraudAlertService<dyn FraudAlertRepository>>,
    ) -> Self {
        Self {
            engine,
            alerts,
            health_checks: Vec::new(),
        }
    }

    /// Backends reported by `/health`
    pub fn with_health_checks(mut self, checks: Vec<Arc<dyn HealthCheck>>) -> Self {
        self.health_checks = checks;
        self
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
    auth: &AuthConfig,
    environment: Environment,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(create_cors(environment))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(routes::health::health_check))
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuth::new(auth))
                .configure(routes::configure),
        )
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", "The requested resource was not found")
}
