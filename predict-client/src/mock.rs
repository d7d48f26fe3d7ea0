//! Mock PredictionService implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::traits::PredictionService;
use crate::types::{PredictionRequest, PredictionResponse, PriceSeries};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Responder<T> = Box<dyn Fn(&PredictionRequest) -> ClientResult<T> + Send>;

/// Mock service for testing - only compiled in test mode or with mock feature
#[derive(Clone, Default)]
pub struct MockPredictionService {
    predict: Arc<Mutex<Option<Responder<PredictionResponse>>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Health,
    Predict(PredictionRequest),
}

impl MockPredictionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the predict response
    pub fn with_predict_response<F>(self, f: F) -> Self
    where
        F: Fn(&PredictionRequest) -> ClientResult<PredictionResponse> + Send + 'static,
    {
        *self.predict.lock().unwrap() = Some(Box::new(f));
        self
    }

    /// Answer every request with a flat series: `predict_days` prices
    /// continuing from the last of three historical ones.
    pub fn with_flat_series(self, price: f64) -> Self {
        self.with_predict_response(move |request| {
            let days = request.predict_days as usize;
            Ok(PredictionResponse {
                historical: PriceSeries {
                    dates: vec![
                        "2024-01-02".to_string(),
                        "2024-01-03".to_string(),
                        "2024-01-04".to_string(),
                    ],
                    prices: vec![price; 3],
                },
                predicted: PriceSeries {
                    dates: (0..days).map(|d| format!("day+{}", d + 1)).collect(),
                    prices: vec![price; days],
                },
                indicators: None,
            })
        })
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }
}

#[async_trait]
impl PredictionService for MockPredictionService {
    async fn health(&self) -> ClientResult<String> {
        self.call_log.lock().unwrap().push(MockCall::Health);
        Ok("Stock Prediction API is running".to_string())
    }

    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse> {
        self.call_log
            .lock()
            .unwrap()
            .push(MockCall::Predict(request.clone()));
        request.validate()?;
        let responder = self.predict.lock().unwrap();
        match responder.as_ref() {
            Some(f) => f(request),
            None => Err(ClientError::NotConfigured("predict".to_string())),
        }
    }
}
