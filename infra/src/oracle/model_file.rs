//! In-process logistic classifier loaded from a JSON model file
//!
//! The file holds a standard scaler for the `[amount, time]` features and a
//! fitted logistic regression:
//!
//! ```json
//! {
//!   "scaler": { "mean": [88.35, 94813.86], "scale": [250.12, 47488.15] },
//!   "weights": [1.72, -0.41],
//!   "intercept": -4.2,
//!   "threshold": 0.5
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use pw_core::{Classification, ScoringOracle};

use crate::InfrastructureError;

fn default_threshold() -> f64 {
    0.5
}

/// Per-feature standardisation: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    pub mean: [f64; 2],
    pub scale: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub scaler: FeatureScaler,
    pub weights: [f64; 2],
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    pub fn validate(&self) -> Result<(), InfrastructureError> {
        let finite = self
            .scaler
            .mean
            .iter()
            .chain(self.scaler.scale.iter())
            .chain(self.weights.iter())
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !finite {
            return Err(InfrastructureError::Model("model contains non-finite parameters".to_string()));
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0) {
            return Err(InfrastructureError::Model("scaler scale must be non-zero".to_string()));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(InfrastructureError::Model(format!(
                "threshold {} must be within (0, 1)",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Fraud probability for a transaction
    pub fn probability(&self, amount: f64, time: f64) -> f64 {
        let features = [amount, time];
        let z = features
            .iter()
            .enumerate()
            .map(|(i, x)| self.weights[i] * (x - self.scaler.mean[i]) / self.scaler.scale[i])
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-z).exp())
    }

    pub fn classify(&self, amount: f64, time: f64) -> Classification {
        let probability = self.probability(amount, time);
        Classification {
            label: u8::from(probability >= self.threshold),
            probability,
        }
    }
}

/// Scoring oracle backed by a [`LogisticModel`] held in memory
pub struct ModelFileScoringOracle {
    model: LogisticModel,
}

impl ModelFileScoringOracle {
    /// Load and validate a model file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            InfrastructureError::Config(format!("cannot read model file {}: {}", path.display(), e))
        })?;
        let model: LogisticModel = serde_json::from_str(&raw)?;
        Self::from_model(model)
    }

    pub fn from_model(model: LogisticModel) -> Result<Self, InfrastructureError> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }
}

#[async_trait]
impl ScoringOracle for ModelFileScoringOracle {
    async fn classify(&self, amount: f64, time: f64) -> Result<Classification, String> {
        let classification = self.model.classify(amount, time);
        if !classification.probability.is_finite() {
            return Err("model produced a non-finite probability".to_string());
        }
        Ok(classification)
    }
}
