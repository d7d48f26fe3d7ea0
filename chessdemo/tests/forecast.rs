//! Forecast report against the mock prediction service.

use chessdemo::forecast::forecast_report;
use predict_client::{
    ClientError, MockCall, MockPredictionService, Period, PredictionRequest,
};

#[tokio::test]
async fn test_report_lists_predicted_prices() {
    let mock = MockPredictionService::new().with_flat_series(101.5);
    let request = PredictionRequest::new(" msft ")
        .with_period(Period::FiveDays)
        .with_predict_days(2)
        .with_time_steps(20);

    let report = forecast_report(&mock, &request).await.unwrap();
    assert_eq!(
        report,
        "MSFT: 3 historical prices (5d)\n\
         \x20 last close 101.50 on 2024-01-04\n\
         \x20 day+1  101.50\n\
         \x20 day+2  101.50\n"
    );

    let calls = mock.get_calls();
    assert_eq!(calls, vec![MockCall::Predict(request)]);
    let MockCall::Predict(sent) = &calls[0] else {
        panic!("expected a predict call");
    };
    assert_eq!(sent.time_steps, 20);
}

#[tokio::test]
async fn test_api_error_is_returned() {
    let mock = MockPredictionService::new()
        .with_predict_response(|_| Err(ClientError::Api("No data found for ticker".to_string())));

    let result = forecast_report(&mock, &PredictionRequest::new("zzzz")).await;
    assert!(matches!(result, Err(ClientError::Api(msg)) if msg.contains("No data")));
}

#[tokio::test]
async fn test_invalid_request_never_succeeds() {
    let mock = MockPredictionService::new().with_flat_series(1.0);
    let request = PredictionRequest::new("aapl").with_predict_days(0);
    assert!(matches!(
        forecast_report(&mock, &request).await,
        Err(ClientError::InvalidRequest(_))
    ));
}
