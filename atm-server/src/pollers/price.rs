//! 价格轮询器

use async_trait::async_trait;
use shared::message::PriceSnapshot;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{PauseListener, PeriodicJob, run_periodic};
use crate::pricing::PriceService;

/// 定期生成价格快照并交给编排器
///
/// 失败时只记录日志，编排器保留上一次的价格
pub struct PricePoller {
    service: PriceService,
    tx: mpsc::Sender<PriceSnapshot>,
}

impl PricePoller {
    pub fn new(service: PriceService, tx: mpsc::Sender<PriceSnapshot>) -> Self {
        Self { service, tx }
    }

    pub async fn run(self, interval: Duration, pause: PauseListener, shutdown: CancellationToken) {
        run_periodic(self, interval, pause, shutdown).await;
    }
}

#[async_trait]
impl PeriodicJob for PricePoller {
    fn name(&self) -> &'static str {
        "price"
    }

    async fn run_once(&mut self) {
        match self.service.snapshot().await {
            Ok(snapshot) => {
                tracing::debug!(currencies = snapshot.currencies.len(), "Price update");
                if self.tx.send(snapshot).await.is_err() {
                    tracing::warn!("Orchestrator gone, dropping price update");
                }
            }
            Err(e) => {
                tracing::error!(code = %e.code, error = %e, "Failed to get XMR price");
            }
        }
    }
}
