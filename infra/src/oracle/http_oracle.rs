//! Client for the external scoring service

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use pw_core::{Classification, ScoringOracle};

use crate::InfrastructureError;

#[derive(Debug, Serialize)]
struct PredictRequest {
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Time")]
    time: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictResponse {
    prediction: Option<i64>,
    #[serde(alias = "probability")]
    fraud_score: Option<f64>,
    error: Option<String>,
}

impl PredictResponse {
    pub(crate) fn into_classification(self) -> Result<Classification, String> {
        if let Some(error) = self.error {
            return Err(format!("scoring service error: {}", error));
        }
        let prediction = self.prediction.ok_or("response missing prediction")?;
        let label = u8::try_from(prediction).map_err(|_| format!("invalid prediction {}", prediction))?;
        // No fallback score: a missing probability is a malformed response
        let probability = self.fraud_score.ok_or("response missing fraud_score")?;
        Ok(Classification { label, probability })
    }
}

/// Scores transactions through `POST <base_url>/predict`
pub struct HttpScoringOracle {
    client: Client,
    predict_url: String,
}

impl HttpScoringOracle {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InfrastructureError> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(InfrastructureError::Config("scoring service URL is empty".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            predict_url: format!("{}/predict", base_url),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl ScoringOracle for HttpScoringOracle {
    async fn classify(&self, amount: f64, time: f64) -> Result<Classification, String> {
        let response = self
            .client
            .post(&self.predict_url)
            .json(&PredictRequest { amount, time })
            .send()
            .await
            .map_err(|e| format!("scoring service unreachable: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, event = "oracle_http_error", "Scoring service returned an error");
            return Err(format!("scoring service returned {}", status));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed scoring response: {}", e))?;

        body.into_classification()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response and return the base URL
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_response_parsing() {
        let parsed: PredictResponse = serde_json::from_str(r#"{"prediction": 1, "fraud_score": 0.93}"#).unwrap();
        let c = parsed.into_classification().unwrap();
        assert_eq!(c.label, 1);
        assert_eq!(c.probability, 0.93);

        let parsed: PredictResponse = serde_json::from_str(r#"{"prediction": 0, "probability": 0.02}"#).unwrap();
        assert_eq!(parsed.into_classification().unwrap().probability, 0.02);
    }

    #[test]
    fn test_missing_probability_is_error() {
        let parsed: PredictResponse = serde_json::from_str(r#"{"prediction": 1}"#).unwrap();
        assert!(parsed.into_classification().is_err());

        let parsed: PredictResponse = serde_json::from_str(r#"{"error": "model not loaded"}"#).unwrap();
        assert!(parsed.into_classification().is_err());

        let parsed: PredictResponse = serde_json::from_str(r#"{"prediction": -1, "fraud_score": 0.5}"#).unwrap();
        assert!(parsed.into_classification().is_err());
    }

    #[test]
    fn test_predict_url() {
        let oracle = HttpScoringOracle::new("http://localhost:5001/", Duration::from_secs(2)).unwrap();
        assert_eq!(oracle.predict_url(), "http://localhost:5001/predict");
        assert!(HttpScoringOracle::new("", Duration::from_secs(2)).is_err());
    }

    #[tokio::test]
    async fn test_classify_over_http() {
        let url = serve_once("200 OK", r#"{"prediction": 1, "fraud_score": 0.87}"#).await;
        let oracle = HttpScoringOracle::new(&url, Duration::from_secs(2)).unwrap();

        let c = oracle.classify(5000.0, 1000.0).await.unwrap();
        assert_eq!(c.label, 1);
        assert_eq!(c.probability, 0.87);
    }

    #[tokio::test]
    async fn test_classify_http_error() {
        let url = serve_once("500 Internal Server Error", r#"{"error": "boom"}"#).await;
        let oracle = HttpScoringOracle::new(&url, Duration::from_secs(2)).unwrap();

        let err = oracle.classify(1.0, 1.0).await.unwrap_err();
        assert!(err.contains("500"));
    }
}
