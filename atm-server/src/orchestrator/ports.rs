//! Outbound ports of the orchestrator
//!
//! The state machine only sees these traits; the MQTT bus, MoneroPay and
//! the websocket hub implement them, tests substitute recording fakes.

use async_trait::async_trait;
use kiosk_bus::Command;
use shared::message::HardwareService;
use shared::{AppResult, Notification};

/// Result of a successful payout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash_list: Vec<String>,
    /// Piconero actually sent
    pub amount: u64,
}

impl TransferReceipt {
    /// First transaction hash, the one shown to the customer
    pub fn primary_tx(&self) -> &str {
        self.tx_hash_list.first().map(String::as_str).unwrap_or_default()
    }
}

/// Start/stop commands to the hardware daemons
#[async_trait]
pub trait HardwareCommander: Send + Sync {
    async fn command(&self, service: HardwareService, cmd: Command) -> AppResult<()>;
}

/// Payment execution service
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Send `amount` piconero to `address`
    async fn transfer(&self, address: &str, amount: u64) -> AppResult<TransferReceipt>;

    /// HTTP-like status code of the service health endpoint
    async fn health(&self) -> AppResult<u16>;
}

/// Outbound notifications to the kiosk screen
///
/// Delivery is best-effort: implementations log failures instead of
/// returning them, a missing screen never blocks a payout.
#[async_trait]
pub trait FrontendNotifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_tx() {
        let receipt = TransferReceipt {
            tx_hash_list: vec!["abc".into(), "def".into()],
            amount: 5,
        };
        assert_eq!(receipt.primary_tx(), "abc");

        let empty = TransferReceipt {
            tx_hash_list: vec![],
            amount: 0,
        };
        assert_eq!(empty.primary_tx(), "");
    }
}
