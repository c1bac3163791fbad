//! MoneroPayClient - HTTP client for the MoneroPay payout wallet

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::{AppError, AppResult, ErrorCode};
use std::time::Duration;

use crate::orchestrator::ports::{PaymentGateway, TransferReceipt};

#[derive(Debug, Serialize)]
struct Destination<'a> {
    amount: u64,
    address: &'a str,
}

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    destinations: Vec<Destination<'a>>,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    #[serde(default)]
    amount: u64,
    #[serde(default)]
    tx_hash_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: u16,
}

/// HTTP client for the MoneroPay API
///
/// Both calls share one client whose timeout bounds the whole request.
#[derive(Debug, Clone)]
pub struct MoneroPayClient {
    client: Client,
    base_url: String,
}

impl MoneroPayClient {
    /// `base_url` is the MoneroPay root, e.g. "http://localhost:5000"
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send piconero to one destination
    pub async fn transfer(&self, address: &str, amount: u64) -> AppResult<TransferReceipt> {
        let request = TransferRequest {
            destinations: vec![Destination {
                amount,
                address: address.trim(),
            }],
        };

        let response = self
            .client
            .post(self.endpoint("/transfer"))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("MoneroPay transfer", e))?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            // MoneroPay reports wallet errors as {"message": ...}
            let body: ErrorResponse = response.json().await.map_err(|e| {
                AppError::with_message(
                    ErrorCode::PaymentInvalidResponse,
                    format!("MoneroPay transfer failed with status {status}: {e}"),
                )
            })?;
            return Err(AppError::transfer_failed(body.message).with_detail("status", status.as_u16()));
        }

        let body: TransferResponse = response.json().await.map_err(|e| {
            AppError::with_message(
                ErrorCode::PaymentInvalidResponse,
                format!("Failed to parse transfer response: {e}"),
            )
        })?;

        if body.tx_hash_list.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::PaymentInvalidResponse,
                "MoneroPay returned no transaction hash",
            ));
        }

        Ok(TransferReceipt {
            tx_hash_list: body.tx_hash_list,
            amount: body.amount,
        })
    }

    /// Status reported by `GET /health`
    pub async fn health(&self) -> AppResult<u16> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(|e| request_error("MoneroPay health", e))?;

        let body: HealthResponse = response.json().await.map_err(|e| {
            AppError::with_message(
                ErrorCode::PaymentInvalidResponse,
                format!("Failed to parse health response: {e}"),
            )
        })?;

        Ok(body.status)
    }
}

fn request_error(what: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::timeout(format!("{what} timed out"))
    } else {
        AppError::with_message(
            ErrorCode::PaymentServiceUnavailable,
            format!("{what} request failed: {e}"),
        )
    }
}

#[async_trait]
impl PaymentGateway for MoneroPayClient {
    async fn transfer(&self, address: &str, amount: u64) -> AppResult<TransferReceipt> {
        MoneroPayClient::transfer(self, address, amount).await
    }

    async fn health(&self) -> AppResult<u16> {
        MoneroPayClient::health(self).await
    }
}
