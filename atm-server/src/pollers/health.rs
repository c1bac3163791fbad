//! MoneroPay 健康轮询器

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{PauseListener, PeriodicJob, run_periodic};
use crate::orchestrator::ports::PaymentGateway;

/// 定期探测支付服务，结果为 true 仅当返回 200
pub struct HealthPoller {
    gateway: Arc<dyn PaymentGateway>,
    tx: mpsc::Sender<bool>,
}

impl HealthPoller {
    pub fn new(gateway: Arc<dyn PaymentGateway>, tx: mpsc::Sender<bool>) -> Self {
        Self { gateway, tx }
    }

    pub async fn run(self, interval: Duration, pause: PauseListener, shutdown: CancellationToken) {
        run_periodic(self, interval, pause, shutdown).await;
    }

    async fn probe(&self) -> bool {
        match self.gateway.health().await {
            Ok(200) => true,
            Ok(status) => {
                tracing::info!(status, "MoneroPay health is degraded");
                false
            }
            Err(e) => {
                tracing::info!(error = %e, "Failed to get MoneroPay health status");
                false
            }
        }
    }
}

#[async_trait]
impl PeriodicJob for HealthPoller {
    fn name(&self) -> &'static str {
        "mpay_health"
    }

    async fn run_once(&mut self) {
        let healthy = self.probe().await;
        tracing::debug!(healthy, "MoneroPay health update");
        if self.tx.send(healthy).await.is_err() {
            tracing::warn!("Orchestrator gone, dropping health update");
        }
    }
}
