//! Stock forecast report for the `predict` subcommand.

use std::fmt::Write;

use predict_client::{ClientResult, PredictionRequest, PredictionService};

/// Ask `service` for a forecast and render it as text, one predicted price
/// per line.
#[tracing::instrument(skip(service), fields(ticker = %request.ticker))]
pub async fn forecast_report(
    service: &dyn PredictionService,
    request: &PredictionRequest,
) -> ClientResult<String> {
    let response = service.predict(request).await?;
    tracing::debug!(
        historical = response.historical.len(),
        predicted = response.predicted.len(),
        "Forecast received"
    );

    let mut out = format!(
        "{}: {} historical prices ({})\n",
        request.ticker,
        response.historical.len(),
        request.period
    );
    if let Some((date, price)) = response.historical.last() {
        let _ = writeln!(out, "  last close {:.2} on {}", price, date);
    }
    for (date, price) in response
        .predicted
        .dates
        .iter()
        .zip(&response.predicted.prices)
    {
        let _ = writeln!(out, "  {}  {:.2}", date, price);
    }
    Ok(out)
}
