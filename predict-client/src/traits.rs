//! PredictionService trait abstraction for client implementations

use crate::error::ClientResult;
use crate::types::{PredictionRequest, PredictionResponse};
use async_trait::async_trait;

/// Prediction API interface.
/// Implemented by both the real PredictClient and MockPredictionService
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Health message from the API root
    async fn health(&self) -> ClientResult<String>;

    /// Historical and predicted closing prices for one ticker
    async fn predict(&self, request: &PredictionRequest) -> ClientResult<PredictionResponse>;
}
