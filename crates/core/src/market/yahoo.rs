use crate::config::Settings;
use crate::market::types::ChartResponse;
use crate::market::MarketDataSource;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// Enough calendar days to cover two sessions across a long weekend.
const CHART_RANGE: &str = "5d";

#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = settings
            .market_data_timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self { http, base_url })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            ticker.replace('^', "%5E")
        )
    }
}

#[async_trait::async_trait]
impl MarketDataSource for YahooChartClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn recent_closes(&self, ticker: &str) -> Result<Vec<Decimal>> {
        let res = self
            .http
            .get(self.chart_url(ticker))
            .query(&[("range", CHART_RANGE), ("interval", "1d")])
            .send()
            .await
            .with_context(|| format!("market data request failed for {ticker}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status} for {ticker}: {text}");
        }

        let parsed = serde_json::from_str::<ChartResponse>(&text)
            .with_context(|| format!("market data response is not a chart payload: {text}"))?;
        parse_closes(ticker, parsed)
    }
}

/// Extracts the close series, skipping sessions without a close.
pub fn parse_closes(ticker: &str, resp: ChartResponse) -> Result<Vec<Decimal>> {
    if let Some(err) = resp.chart.error {
        anyhow::bail!("chart error for {ticker}: {}: {}", err.code, err.description);
    }

    let series = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .with_context(|| format!("chart result is empty for {ticker}"))?;
    let quote = series
        .indicators
        .quote
        .into_iter()
        .next()
        .with_context(|| format!("chart has no quote series for {ticker}"))?;

    let closes = quote
        .close
        .into_iter()
        .flatten()
        .filter_map(|c| Decimal::try_from(c).ok())
        .collect();
    Ok(closes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn chart_body(closes: serde_json::Value) -> String {
        json!({
            "chart": {
                "result": [{
                    "timestamp": [1767571200, 1767657600, 1767744000],
                    "indicators": {"quote": [{"close": closes}]}
                }],
                "error": null
            }
        })
        .to_string()
    }

    fn client_for(server: &mockito::Server) -> YahooChartClient {
        let settings = Settings {
            market_data_base_url: Some(server.url()),
            ..Settings::default()
        };
        YahooChartClient::from_settings(&settings).unwrap()
    }

    #[test]
    fn parse_skips_missing_closes() {
        let resp: ChartResponse =
            serde_json::from_str(&chart_body(json!([2630.1, null, 2650.55]))).unwrap();
        let closes = parse_closes("^KS11", resp).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[1].round_dp(2), dec!(2650.55));
    }

    #[test]
    fn parse_surfaces_chart_error() {
        let resp: ChartResponse = serde_json::from_value(json!({
            "chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}
        }))
        .unwrap();
        let err = parse_closes("^XXXX", resp).unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[tokio::test]
    async fn fetches_closes_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/%5EKS11")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chart_body(json!([2610.0, 2630.1, 2650.55])))
            .create_async()
            .await;

        let closes = client_for(&server).recent_closes("^KS11").await.unwrap();
        mock.assert_async().await;
        assert_eq!(closes.len(), 3);
        assert_eq!(closes[0].round_dp(2), dec!(2610.00));
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v8/finance/chart/%5EDJI")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let res = client_for(&server).recent_closes("^DJI").await;
        assert!(res.is_err());
    }
}
