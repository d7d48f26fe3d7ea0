//! Wire types of the prediction API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Default number of past closing prices fed to the model.
pub const DEFAULT_TIME_STEPS: u32 = 60;

/// Default number of business days to predict.
pub const DEFAULT_PREDICT_DAYS: u32 = 30;

/// Historical window returned alongside the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
    #[serde(rename = "all")]
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1m",
            Period::SixMonths => "6m",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
            Period::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1d" => Ok(Period::OneDay),
            "5d" => Ok(Period::FiveDays),
            "1m" => Ok(Period::OneMonth),
            "6m" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "5y" => Ok(Period::FiveYears),
            "ytd" => Ok(Period::YearToDate),
            "max" => Ok(Period::Max),
            "all" => Ok(Period::All),
            other => Err(ClientError::InvalidRequest(format!("unknown period: {}", other))),
        }
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub ticker: String,
    #[serde(default)]
    pub period: Period,
    pub time_steps: u32,
    pub predict_days: u32,
}

impl PredictionRequest {
    /// Request with default settings. The ticker is upper-cased.
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            period: Period::default(),
            time_steps: DEFAULT_TIME_STEPS,
            predict_days: DEFAULT_PREDICT_DAYS,
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_predict_days(mut self, days: u32) -> Self {
        self.predict_days = days;
        self
    }

    pub fn with_time_steps(mut self, steps: u32) -> Self {
        self.time_steps = steps;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.ticker.is_empty() {
            return Err(ClientError::InvalidRequest("ticker is empty".to_string()));
        }
        if self.predict_days == 0 {
            return Err(ClientError::InvalidRequest(
                "predict_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Dated closing prices, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Most recent `(date, price)` pair.
    pub fn last(&self) -> Option<(&str, f64)> {
        let date = self.dates.last()?;
        let price = self.prices.last()?;
        Some((date.as_str(), *price))
    }
}

/// Successful answer of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub historical: PriceSeries,
    pub predicted: PriceSeries,
    /// Optional technical indicators, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<serde_json::Value>,
}

/// Either shape the API may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawResponse {
    Error { error: String },
    Prediction(PredictionResponse),
}

impl RawResponse {
    pub(crate) fn into_result(self) -> Result<PredictionResponse, ClientError> {
        match self {
            RawResponse::Error { error } => Err(ClientError::Api(error)),
            RawResponse::Prediction(response) => {
                if response.historical.dates.len() != response.historical.prices.len()
                    || response.predicted.dates.len() != response.predicted.prices.len()
                {
                    return Err(ClientError::InvalidData(
                        "dates and prices differ in length".to_string(),
                    ));
                }
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = PredictionRequest::new(" nvda ");
        assert_eq!(request.ticker, "NVDA");
        assert_eq!(request.period, Period::OneYear);
        assert_eq!(request.time_steps, 60);
        assert_eq!(request.predict_days, 30);
    }

    #[test]
    fn test_request_json_shape() {
        let request = PredictionRequest::new("msft").with_period(Period::YearToDate);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ticker": "MSFT",
                "period": "ytd",
                "time_steps": 60,
                "predict_days": 30,
            })
        );
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("5Y".parse::<Period>().unwrap(), Period::FiveYears);
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert!("2w".parse::<Period>().is_err());
        assert_eq!(Period::SixMonths.to_string(), "6m");
    }

    #[test]
    fn test_validate() {
        assert!(PredictionRequest::new("  ").validate().is_err());
        assert!(PredictionRequest::new("aapl")
            .with_predict_days(0)
            .validate()
            .is_err());
        assert!(PredictionRequest::new("aapl").validate().is_ok());
    }

    #[test]
    fn test_parse_prediction() {
        let body = r#"{
            "historical": {"dates": ["2024-01-02", "2024-01-03"], "prices": [185.6, 184.2]},
            "predicted": {"dates": ["2024-01-04"], "prices": [186.0]}
        }"#;
        let raw: RawResponse = serde_json::from_str(body).unwrap();
        let response = raw.into_result().unwrap();
        assert_eq!(response.historical.len(), 2);
        assert_eq!(response.historical.last(), Some(("2024-01-03", 184.2)));
        assert_eq!(response.predicted.len(), 1);
        assert!(response.indicators.is_none());
    }

    #[test]
    fn test_parse_error_body() {
        let raw: RawResponse =
            serde_json::from_str(r#"{"error": "Could not fetch data for XYZ"}"#).unwrap();
        assert!(matches!(
            raw.into_result(),
            Err(ClientError::Api(msg)) if msg == "Could not fetch data for XYZ"
        ));
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let body = r#"{
            "historical": {"dates": ["2024-01-02"], "prices": []},
            "predicted": {"dates": [], "prices": []}
        }"#;
        let raw: RawResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(raw.into_result(), Err(ClientError::InvalidData(_))));
    }
}
