//! HTTP implementation of the prediction API

use crate::error::{ClientError, ClientResult};
use crate::traits::PredictionService;
use crate::types::{PredictionRequest, PredictionResponse, RawResponse};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound for one API call, model inference included.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Network client for the prediction API
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct HealthBody {
    message: String,
}

impl PredictClient {
    /// Client for the API rooted at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidAddress(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PredictionService for PredictClient {
    async fn health(&self) -> ClientResult<String> {
        let body: HealthBody = self
            .http
            .get(self.endpoint("/"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body.message)
    }

    #[tracing::instrument(level = "debug", skip(self), fields(ticker = %request.ticker))]
    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse> {
        request.validate()?;
        let raw: RawResponse = self
            .http
            .post(self.endpoint("/predict"))
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let response = raw.into_result()?;
        tracing::debug!(
            historical = response.historical.len(),
            predicted = response.predicted.len(),
            "Prediction received"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalised() {
        let client = PredictClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/predict"), "http://localhost:8000/predict");
        assert_eq!(client.endpoint("/"), "http://localhost:8000/");
    }

    #[test]
    fn test_rejects_non_http_address() {
        assert!(matches!(
            PredictClient::new("localhost:8000"),
            Err(ClientError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_sending() {
        let client = PredictClient::new("http://127.0.0.1:9").unwrap();
        let result = client.predict(&PredictionRequest::new("")).await;
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }
}
