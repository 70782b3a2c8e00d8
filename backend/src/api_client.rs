use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::FetchWindow;
use crate::models::{ColumnSet, GroupedColumn, RawPriceTable};

const USER_AGENT: &str = "nifty-signal/0.1";

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

// Each field is one value per timestamp; gaps come back as null
#[derive(Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Client for the Yahoo Finance chart endpoint
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch intraday bars for one ticker.
    /// Columns come back labeled by (field, ticker), oldest bar first.
    pub async fn fetch_chart(
        &self,
        ticker: &str,
        window: &FetchWindow,
    ) -> Result<RawPriceTable, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        tracing::info!(
            "Fetching {} bars for {} over {}",
            window.interval,
            ticker,
            window.range
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", window.range.as_str()),
                ("interval", window.interval.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::ParseError(format!("Failed to get response text: {}", e)))?;

        // Error responses usually still carry a chart envelope with the reason
        let body: ChartResponse = match serde_json::from_str(&response_text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Upstream(format!("HTTP {} for {}", status, ticker)))
            }
            Err(e) => {
                return Err(ApiError::ParseError(format!(
                    "Failed to parse chart response: {}",
                    e
                )))
            }
        };

        // A chart error names the cause, so it takes precedence over the status
        if !status.is_success() && body.chart.error.is_none() {
            return Err(ApiError::Upstream(format!("HTTP {} for {}", status, ticker)));
        }

        let table = parse_chart(ticker, body)?;
        tracing::info!("Fetched {} bars for {}", table.timestamps.len(), ticker);
        Ok(table)
    }
}

fn parse_chart(ticker: &str, body: ChartResponse) -> Result<RawPriceTable, ApiError> {
    if let Some(error) = body.chart.error {
        return Err(ApiError::Upstream(format!(
            "{}: {}",
            error.code.unwrap_or_else(|| "error".to_string()),
            error.description.unwrap_or_default()
        )));
    }

    let result = body
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ApiError::ParseError("Chart response contained no result".to_string()))?;

    if result.timestamp.is_empty() {
        return Err(ApiError::Upstream(format!("No price data returned for {}", ticker)));
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::ParseError("Chart response contained no quote".to_string()))?;

    let timestamps = result
        .timestamp
        .iter()
        .map(|&ts| {
            DateTime::<Utc>::from_timestamp(ts, 0)
                .ok_or_else(|| ApiError::ParseError(format!("Invalid timestamp {}", ts)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Chronological, first bar wins on duplicate timestamps
    let mut order: Vec<usize> = (0..timestamps.len()).collect();
    order.sort_by_key(|&i| timestamps[i]);
    order.dedup_by_key(|i| timestamps[*i]);

    if !quote.close.iter().any(Option::is_some) {
        return Err(ApiError::Upstream(format!("No close prices returned for {}", ticker)));
    }

    let fields = [
        ("Open", quote.open),
        ("High", quote.high),
        ("Low", quote.low),
        ("Close", quote.close),
        ("Volume", quote.volume),
    ];

    let mut columns = Vec::with_capacity(fields.len());
    for (field, values) in fields {
        if values.is_empty() && field != "Close" {
            continue;
        }
        if values.len() != timestamps.len() {
            return Err(ApiError::ParseError(format!(
                "{} has {} values for {} timestamps",
                field,
                values.len(),
                timestamps.len()
            )));
        }
        columns.push(GroupedColumn {
            field: field.to_string(),
            ticker: ticker.to_string(),
            values: order.iter().map(|&i| values[i]).collect(),
        });
    }

    Ok(RawPriceTable {
        timestamps: order.iter().map(|&i| timestamps[i]).collect(),
        columns: ColumnSet::Grouped(columns),
    })
}
