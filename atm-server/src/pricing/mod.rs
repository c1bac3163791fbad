//! XMR Price Module
//!
//! Builds one [`PriceSnapshot`] per poll covering every configured currency:
//!
//! - EUR and USD are quoted directly by [`KrakenClient`]
//! - Any other currency is `XMR/EUR × EUR/currency` using the ECB table
//!   loaded at startup
//! - Every price is marked up by the configured fee
//!
//! A single failed lookup fails the whole snapshot.

pub mod ecb;
pub mod kraken;

pub use kraken::KrakenClient;

use async_trait::async_trait;
use shared::message::{PriceSnapshot, XmrPrice};
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;

/// Source of direct XMR quotes
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Price of 1 XMR in `currency` (EUR or USD)
    async fn xmr_rate(&self, currency: &str) -> AppResult<f64>;
}

/// Load the EUR cross-rate table for currencies Kraken does not quote
///
/// `overrides` (FIAT_RATES) replaces the ECB download entirely. A currency
/// missing from the table is left out; [`PriceService::snapshot`] then fails
/// every cycle with `CrossRateMissing` until the table is fixed.
pub async fn load_cross_rates(
    needed: &[String],
    overrides: Option<&HashMap<String, f64>>,
    ecb_url: &str,
) -> AppResult<HashMap<String, f64>> {
    if needed.is_empty() {
        return Ok(HashMap::new());
    }

    let table = match overrides {
        Some(rates) => {
            tracing::info!(count = rates.len(), "Using configured fiat cross-rates");
            rates.clone()
        }
        None => {
            let rates = ecb::fetch_daily_rates(ecb_url).await?;
            tracing::info!(count = rates.len(), "Loaded ECB daily rates");
            rates
        }
    };

    let mut rates = HashMap::with_capacity(needed.len());
    for currency in needed {
        match table.get(currency) {
            Some(rate) => {
                rates.insert(currency.clone(), *rate);
            }
            None => {
                tracing::warn!(currency = %currency, "No EUR cross-rate, prices will not be published");
            }
        }
    }
    Ok(rates)
}

/// Prices every configured currency from one set of quotes
pub struct PriceService {
    source: Arc<dyn RateSource>,
    currencies: Vec<String>,
    cross_rates: HashMap<String, f64>,
    fee: f64,
}

impl PriceService {
    pub fn new(
        source: Arc<dyn RateSource>,
        currencies: Vec<String>,
        cross_rates: HashMap<String, f64>,
        fee: f64,
    ) -> Self {
        Self {
            source,
            currencies,
            cross_rates,
            fee,
        }
    }

    /// Fetch quotes and build a complete snapshot
    pub async fn snapshot(&self) -> AppResult<PriceSnapshot> {
        let eur = self.source.xmr_rate("EUR").await?;
        let mut usd = None;

        let mut currencies = Vec::with_capacity(self.currencies.len());
        for currency in &self.currencies {
            let base = match currency.as_str() {
                "EUR" => eur,
                "USD" => match usd {
                    Some(rate) => rate,
                    None => {
                        let rate = self.source.xmr_rate("USD").await?;
                        usd = Some(rate);
                        rate
                    }
                },
                other => {
                    let cross = self.cross_rates.get(other).ok_or_else(|| {
                        AppError::with_message(
                            ErrorCode::CrossRateMissing,
                            format!("No EUR cross-rate for {other}"),
                        )
                    })?;
                    eur * cross
                }
            };

            currencies.push(XmrPrice {
                amount: base * (1.0 + self.fee),
                short: currency.clone(),
            });
        }

        Ok(PriceSnapshot { currencies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fixed quotes; records every lookup
    struct FixedRates {
        rates: HashMap<&'static str, f64>,
        calls: Mutex<Vec<String>>,
    }

    impl FixedRates {
        fn new(rates: &[(&'static str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                rates: rates.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RateSource for FixedRates {
        async fn xmr_rate(&self, currency: &str) -> AppResult<f64> {
            self.calls.lock().unwrap().push(currency.to_string());
            self.rates
                .get(currency)
                .copied()
                .ok_or_else(|| AppError::rate_unavailable(format!("no {currency}")))
        }
    }

    fn service(source: Arc<FixedRates>, currencies: &[&str], fee: f64) -> PriceService {
        let cross = HashMap::from([("GBP".to_string(), 0.85)]);
        PriceService::new(
            source,
            currencies.iter().map(|c| c.to_string()).collect(),
            cross,
            fee,
        )
    }

    #[tokio::test]
    async fn test_snapshot_applies_fee_and_cross_rates() {
        let source = FixedRates::new(&[("EUR", 150.0), ("USD", 160.0)]);
        let snapshot = service(source, &["EUR", "USD", "GBP"], 0.1)
            .snapshot()
            .await
            .unwrap();

        let prices: Vec<(&str, f64)> = snapshot
            .currencies
            .iter()
            .map(|p| (p.short.as_str(), p.amount))
            .collect();
        assert_eq!(
            prices,
            vec![
                ("EUR", 150.0 * 1.1),
                ("USD", 160.0 * 1.1),
                ("GBP", 150.0 * 0.85 * 1.1),
            ]
        );
    }

    #[tokio::test]
    async fn test_usd_fetched_once() {
        let source = FixedRates::new(&[("EUR", 150.0), ("USD", 160.0)]);
        service(source.clone(), &["USD", "EUR", "USD"], 0.0)
            .snapshot()
            .await
            .unwrap();
        assert_eq!(*source.calls.lock().unwrap(), vec!["EUR", "USD"]);
    }

    #[tokio::test]
    async fn test_one_failure_fails_the_snapshot() {
        let source = FixedRates::new(&[("EUR", 150.0)]);
        let err = service(source, &["EUR", "USD"], 0.0)
            .snapshot()
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RateUnavailable);

        let source = FixedRates::new(&[("EUR", 150.0)]);
        let err = service(source, &["EUR", "CHF"], 0.0)
            .snapshot()
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CrossRateMissing);
    }

    #[tokio::test]
    async fn test_cross_rates_from_overrides() {
        let overrides = HashMap::from([("GBP".to_string(), 0.85), ("CHF".to_string(), 0.94)]);
        let needed = vec!["GBP".to_string()];

        // The URL is never contacted when overrides are present
        let rates = load_cross_rates(&needed, Some(&overrides), "http://127.0.0.1:1/unused")
            .await
            .unwrap();
        assert_eq!(rates, HashMap::from([("GBP".to_string(), 0.85)]));

        // A currency without a rate is skipped, not fatal
        let needed = vec!["GBP".to_string(), "JPY".to_string()];
        let rates = load_cross_rates(&needed, Some(&overrides), "http://127.0.0.1:1/unused")
            .await
            .unwrap();
        assert_eq!(rates, HashMap::from([("GBP".to_string(), 0.85)]));

        assert!(load_cross_rates(&[], None, "http://127.0.0.1:1/unused")
            .await
            .unwrap()
            .is_empty());
    }
}
