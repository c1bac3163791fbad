//! Server Implementation
//!
//! 启动顺序：
//! 1. 交叉汇率（下载失败即退出，缺失的币种只告警）
//! 2. 硬件总线、MoneroPay、前端登记处
//! 3. 后台任务：编排器、硬件监听、价格与健康轮询
//! 4. HTTP 服务 (`/ws`, `/health`)，Ctrl+C 后优雅退出

use axum::{Json, Router, routing::get};
use kiosk_bus::BusConfig;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerState};
use crate::frontend::{self, FrontendHub};
use crate::hardware::{BusCommander, HardwareListener};
use crate::orchestrator::channels::DEFAULT_BUFFER;
use crate::orchestrator::{HardwareCommander, Orchestrator, PaymentGateway, event_channels};
use crate::pollers::{HealthPoller, PollerControl, PricePoller, pause_channel};
use crate::pricing::{self, KrakenClient, PriceService};
use crate::services::MoneroPayClient;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// HTTP 路由
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/ws", get(frontend::ws::handle_ws))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Kiosk backend server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config;

        // 1. Cross-rate table, fixed for the process lifetime
        let cross_rates = pricing::load_cross_rates(
            &config.cross_currencies(),
            config.fiat_rates.as_ref(),
            &config.ecb_url,
        )
        .await?;

        // 2. Services
        let bus_config = BusConfig::new(&config.mqtt_host, config.mqtt_port, &config.mqtt_client_id)
            .with_topics(config.mqtt_topics.clone())
            .with_ready_timeout(config.bus_ready_timeout);
        let (bus_client, bus_events) = kiosk_bus::connect(&bus_config)?;

        let hardware: Arc<dyn HardwareCommander> = Arc::new(BusCommander::new(bus_client));
        let payments: Arc<dyn PaymentGateway> = Arc::new(MoneroPayClient::new(
            &config.moneropay_url,
            config.moneropay_timeout,
        )?);
        let frontend = Arc::new(FrontendHub::new(config.ui_ready_timeout));
        let price_service = PriceService::new(
            Arc::new(KrakenClient::new(&config.kraken_url)),
            config.currencies.clone(),
            cross_rates,
            config.fee,
        );

        // 3. Background tasks
        let (senders, channels) = event_channels(DEFAULT_BUFFER);
        let (price_switch, price_pause) = pause_channel();
        let (health_switch, health_pause) = pause_channel();
        let mut tasks = BackgroundTasks::new();

        let orchestrator = Orchestrator::new(
            config.network,
            hardware.clone(),
            payments.clone(),
            frontend.clone(),
            PollerControl::new(price_switch, health_switch),
        );
        tasks.spawn(
            "orchestrator",
            TaskKind::Worker,
            orchestrator.run(channels, tasks.shutdown_token()),
        );

        let listener = HardwareListener::new(bus_events, senders.hardware.clone());
        tasks.spawn(
            "hardware_listener",
            TaskKind::Listener,
            listener.run(tasks.shutdown_token()),
        );

        let price_poller = PricePoller::new(price_service, senders.price.clone());
        tasks.spawn(
            "price_poller",
            TaskKind::Periodic,
            price_poller.run(config.price_poll_interval, price_pause, tasks.shutdown_token()),
        );

        let health_poller = HealthPoller::new(payments, senders.health.clone());
        tasks.spawn(
            "health_poller",
            TaskKind::Periodic,
            health_poller.run(config.health_poll_interval, health_pause, tasks.shutdown_token()),
        );

        tasks.log_summary();

        // 4. HTTP
        let state = ServerState::new(frontend, hardware, senders.ui.clone());
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
        tracing::info!("🏧 ATM server listening on {}", config.bind_addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tasks.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kiosk_bus::Command;
    use shared::AppResult;
    use shared::message::HardwareService;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct NoHardware;

    #[async_trait]
    impl HardwareCommander for NoHardware {
        async fn command(&self, _service: HardwareService, _cmd: Command) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_health_route() {
        let (ui_tx, _ui_rx) = mpsc::channel(1);
        let state = ServerState::new(
            Arc::new(FrontendHub::new(Duration::from_secs(1))),
            Arc::new(NoHardware),
            ui_tx,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }
}
