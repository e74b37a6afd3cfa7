//! Scoring oracle adapters
//!
//! - **HTTP**: the external scoring service (`POST /predict`)
//! - **Model file**: a logistic model evaluated in-process

pub mod http_oracle;
pub mod model_file;

use std::sync::Arc;
use std::time::Duration;

use pw_core::ScoringOracle;
use pw_shared::OracleProvider;

use crate::config::OracleConfig;
use crate::InfrastructureError;

pub use http_oracle::HttpScoringOracle;
pub use model_file::{FeatureScaler, LogisticModel, ModelFileScoringOracle};

/// Build the configured scoring oracle
///
/// A model file that cannot be loaded is fatal here so the server never
/// starts without a classifier.
pub fn create_scoring_oracle(
    config: &OracleConfig,
    request_timeout: Duration,
) -> Result<Arc<dyn ScoringOracle>, InfrastructureError> {
    match config.provider {
        OracleProvider::Http => {
            tracing::info!(url = %config.url, "Using HTTP scoring oracle");
            Ok(Arc::new(HttpScoringOracle::new(&config.url, request_timeout)?))
        }
        OracleProvider::ModelFile => {
            tracing::info!(path = %config.model_path, "Using model-file scoring oracle");
            Ok(Arc::new(ModelFileScoringOracle::load(&config.model_path)?))
        }
    }
}
