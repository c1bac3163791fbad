//! Kraken public ticker
//!
//! Only XMR/EUR and XMR/USD are listed; other currencies are derived from
//! EUR through the cross-rate table.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

use super::RateSource;

/// Currencies with a direct XMR pair
pub const DIRECT_QUOTES: [&str; 2] = ["EUR", "USD"];

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    /// Last trade closed: [price, lot volume]
    c: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct KrakenClient {
    client: Client,
    base_url: String,
}

impl KrakenClient {
    /// `base_url` is the API root, e.g. "https://api.kraken.com"
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Last traded price of 1 XMR in `currency`
    pub async fn last_price(&self, currency: &str) -> AppResult<f64> {
        if !DIRECT_QUOTES.contains(&currency) {
            return Err(AppError::rate_unavailable(format!(
                "non-existent XMR pair on Kraken: XMR{currency}"
            )));
        }

        let url = format!("{}/0/public/Ticker", self.base_url);
        let pair = format!("XMR{currency}");
        let response = self
            .client
            .get(&url)
            .query(&[("pair", pair.as_str())])
            .send()
            .await
            .map_err(|e| AppError::network(format!("Kraken request failed: {e}")))?;

        let body: TickerResponse = response
            .json()
            .await
            .map_err(|e| AppError::rate_unavailable(format!("Failed to parse Kraken ticker: {e}")))?;

        if !body.error.is_empty() {
            return Err(AppError::rate_unavailable(format!(
                "Kraken error: {}",
                body.error.join(", ")
            )));
        }

        // Kraken keys legacy assets as X<base>Z<quote>
        let key = format!("XXMRZ{currency}");
        let last = body
            .result
            .get(&key)
            .and_then(|t| t.c.first())
            .ok_or_else(|| AppError::rate_unavailable(format!("Kraken ticker has no {key} price")))?;

        last.parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::RateUnavailable,
                    format!("Invalid Kraken price {last:?} for {key}"),
                )
            })
    }
}

#[async_trait]
impl RateSource for KrakenClient {
    async fn xmr_rate(&self, currency: &str) -> AppResult<f64> {
        self.last_price(currency).await
    }
}
