//! Client for the stock prediction API.
//!
//! Provides the request/response types of `POST /predict`, a
//! [`PredictionService`] abstraction, and an HTTP implementation.
//!
//! # Example
//!
//! ```no_run
//! use predict_client::{PredictClient, PredictionRequest, PredictionService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PredictClient::new("http://localhost:8000")?;
//!     let response = client.predict(&PredictionRequest::new("aapl")).await?;
//!     println!("{} predicted prices", response.predicted.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod traits;
mod types;

pub use client::PredictClient;
pub use error::{ClientError, ClientResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockPredictionService};
pub use traits::PredictionService;
pub use types::{
    Period, PredictionRequest, PredictionResponse, PriceSeries, DEFAULT_PREDICT_DAYS,
    DEFAULT_TIME_STEPS,
};
