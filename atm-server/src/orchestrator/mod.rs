//! Transaction Orchestrator
//!
//! 单任务事件循环，独占 [`Session`]，一次只处理一个事件：
//!
//! ```text
//!             ┌──────────── UiCommand ◄──── websocket reader
//!             │ ┌────────── HardwareEvent ◄ hardware listener
//! Orchestrator┤ ├────────── PriceSnapshot ◄ price poller   ◄─┐
//!             │ └────────── bool (health) ◄ health poller  ◄─┤ pause/resume
//!             │                                              │
//!             ├──► HardwareCommander (start/stop)            │
//!             ├──► PaymentGateway (transfer)                 │
//!             ├──► FrontendNotifier (updates)                │
//!             └──► PollerControl ────────────────────────────┘
//! ```
//!
//! # 状态转换
//!
//! | 状态 | 事件 | 动作 | 新状态 |
//! |------|------|------|--------|
//! | Idle | UI start | 暂停轮询 | AddressIn |
//! | 任意 | 有效扫码 | 记录地址，通知 addressin（Idle 时暂停轮询） | ≥ AddressIn |
//! | 任意 | 无效扫码 | 通知 error | 不变 |
//! | AddressIn | UI moneyin | stop 扫码器，start 识别器 | MoneyIn |
//! | MoneyIn | 投币 | 累加余额，通知 moneyin | MoneyIn |
//! | MoneyIn | UI txinfo | stop 识别器，换算并转账 | 成功: Idle / 失败: TxInfo |
//! | 任意 | UI cancel / final | reset | Idle |
//!
//! 其他组合记录警告后忽略。价格与健康快照与状态无关，总是转发给前端。
//!
//! 转账失败时会话保持在 TxInfo，轮询保持暂停，直到前端发送 cancel 或 final。

pub mod channels;
pub mod conversion;
pub mod ports;
pub mod session;

pub use channels::{EventChannels, EventSenders, KioskEvent, event_channels};
pub use conversion::{ConversionError, xmr_amount};
pub use ports::{FrontendNotifier, HardwareCommander, PaymentGateway, TransferReceipt};
pub use session::{Session, SessionState};

use kiosk_bus::Command;
use shared::message::{HardwareService, MoneyInData, PriceSnapshot, TxInfoData};
use shared::util::xmr_to_decimal;
use shared::{AppError, ErrorCode, HardwareEvent, Notification, UiCommand};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::audit_log;
use crate::pollers::PollerControl;
use crate::utils::validation::{Network, normalize_address, validate_address};

/// 交易编排器
pub struct Orchestrator {
    session: Session,
    /// 币种 -> 最近一次价格（每 XMR，含手续费）
    rates: HashMap<String, f64>,
    network: Network,
    hardware: Arc<dyn HardwareCommander>,
    payments: Arc<dyn PaymentGateway>,
    frontend: Arc<dyn FrontendNotifier>,
    pollers: PollerControl,
}

impl Orchestrator {
    pub fn new(
        network: Network,
        hardware: Arc<dyn HardwareCommander>,
        payments: Arc<dyn PaymentGateway>,
        frontend: Arc<dyn FrontendNotifier>,
        pollers: PollerControl,
    ) -> Self {
        Self {
            session: Session::new(),
            rates: HashMap::new(),
            network,
            hardware,
            payments,
            frontend,
            pollers,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn rates(&self) -> &HashMap<String, f64> {
        &self.rates
    }

    /// 运行事件循环，直到 shutdown 或所有输入关闭
    pub async fn run(mut self, mut channels: EventChannels, shutdown: CancellationToken) {
        tracing::info!(network = %self.network, "Orchestrator started");

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Orchestrator received shutdown signal");
                    break;
                }
                event = channels.recv() => event,
            };

            match event {
                Some(event) => self.handle(event).await,
                None => {
                    tracing::info!("All event sources closed, orchestrator stopping");
                    break;
                }
            }
        }
    }

    /// 处理单个事件（完整执行后才返回）
    pub async fn handle(&mut self, event: KioskEvent) {
        match event {
            KioskEvent::Ui(cmd) => self.handle_ui(cmd).await,
            KioskEvent::Hardware(event) => self.handle_hardware(event).await,
            KioskEvent::Price(snapshot) => self.handle_price(snapshot).await,
            KioskEvent::Health(healthy) => {
                self.frontend.notify(Notification::MpayHealth(healthy)).await;
            }
        }
    }

    async fn handle_ui(&mut self, cmd: UiCommand) {
        let state = self.session.state;
        match (state, cmd) {
            (_, UiCommand::Cancel) => {
                self.reset().await;
                tracing::info!(from = %state, "Cancelled transaction");
            }
            (_, UiCommand::Final) => {
                self.reset().await;
                tracing::info!(from = %state, "Finalized transaction");
            }
            (SessionState::Idle, UiCommand::Start) => {
                self.begin_transaction();
                self.session.state = SessionState::AddressIn;
            }
            (SessionState::AddressIn, UiCommand::MoneyIn) => {
                self.command(HardwareService::CodeScanner, Command::Stop).await;
                self.command(HardwareService::MoneyAcceptor, Command::Start).await;
                self.session.state = SessionState::MoneyIn;
                tracing::info!("Accepting cash");
            }
            (SessionState::MoneyIn, UiCommand::TxInfo) => {
                self.finish_transaction().await;
            }
            (state, cmd) => {
                tracing::warn!(
                    code = %ErrorCode::InvalidTransition,
                    state = %state,
                    event = ?cmd,
                    "Ignoring frontend event in this state"
                );
            }
        }
    }

    async fn handle_hardware(&mut self, event: HardwareEvent) {
        match event {
            HardwareEvent::CodeScan(raw) => self.handle_scan(&raw).await,
            HardwareEvent::MoneyIn(data) => self.handle_money_in(data).await,
        }
    }

    async fn handle_scan(&mut self, raw: &str) {
        let address = normalize_address(raw);
        if let Err(e) = validate_address(address, self.network) {
            let err = AppError::from(e);
            tracing::warn!(code = %err.code, error = %err, "Invalid address received");
            self.frontend.notify(Notification::Error(err.message)).await;
            return;
        }

        self.session.address = address.to_string();
        self.frontend
            .notify(Notification::AddressIn(address.to_string()))
            .await;

        // Transaction began by scanning instead of tapping start
        if self.session.state == SessionState::Idle {
            self.begin_transaction();
            self.session.state = SessionState::AddressIn;
        }
    }

    async fn handle_money_in(&mut self, data: MoneyInData) {
        if self.session.state != SessionState::MoneyIn {
            tracing::warn!(
                state = %self.session.state,
                currency = %data.currency,
                amount = data.amount,
                "Cash reported outside of cash intake, ignoring"
            );
            return;
        }

        self.session.credit(&data.currency, data.amount);
        tracing::info!(currency = %data.currency, amount = data.amount, balance = ?self.session.balance, "Cash inserted");
        self.frontend.notify(Notification::MoneyIn(data)).await;
    }

    async fn handle_price(&mut self, snapshot: PriceSnapshot) {
        for price in &snapshot.currencies {
            self.rates.insert(price.short.clone(), price.amount);
        }
        self.frontend.notify(Notification::Price(snapshot)).await;
    }

    /// MoneyIn -> TxInfo：停止收币，换算并转账
    async fn finish_transaction(&mut self) {
        self.session.state = SessionState::TxInfo;
        self.command(HardwareService::MoneyAcceptor, Command::Stop).await;

        let amount = match xmr_amount(&self.session.balance, &self.rates) {
            Ok(amount) => amount,
            Err(e) => {
                let err = AppError::from(e);
                tracing::error!(code = %err.code, error = %err, balance = ?self.session.balance, "Failed to convert balance");
                self.fail_transaction(err.message).await;
                return;
            }
        };
        self.session.xmr_amount = amount;

        let decimal = xmr_to_decimal(amount);
        match self.payments.transfer(&self.session.address, amount).await {
            Ok(receipt) => {
                let tx = receipt.primary_tx().to_string();
                tracing::info!(amount = %decimal, address = %self.session.address, tx = %tx, "Sent XMR");
                audit_log!(
                    "transfer",
                    self.session.address.as_str(),
                    decimal.as_str(),
                    format!("tx={tx} balance={:?}", self.session.balance)
                );

                self.session.receipt = Some(receipt);
                self.frontend
                    .notify(Notification::TxInfo(TxInfoData {
                        tx,
                        amount: decimal,
                    }))
                    .await;

                self.reset().await;
                tracing::info!("Finalized transaction");
            }
            Err(e) => {
                tracing::error!(code = %e.code, error = %e, "Failed to send XMR");
                audit_log!(
                    "transfer_failed",
                    self.session.address.as_str(),
                    decimal.as_str(),
                    e.message.as_str()
                );
                self.fail_transaction(e.message).await;
            }
        }
    }

    /// 会话保留在 TxInfo，等待前端 cancel / final
    async fn fail_transaction(&mut self, message: String) {
        self.session.last_error = Some(message.clone());
        self.frontend.notify(Notification::Error(message)).await;
    }

    fn begin_transaction(&mut self) {
        self.pollers.pause_all();
        tracing::info!("Began new transaction");
    }

    /// 清空会话，恢复轮询，回到扫码页
    async fn reset(&mut self) {
        self.session.reset();
        self.pollers.resume_all();
        self.command(HardwareService::MoneyAcceptor, Command::Stop).await;
        self.command(HardwareService::CodeScanner, Command::Start).await;
    }

    /// 硬件指令失败只记录，不影响状态
    async fn command(&self, service: HardwareService, cmd: Command) {
        if let Err(e) = self.hardware.command(service, cmd).await {
            tracing::error!(service = %service, cmd = %cmd, code = %e.code, error = %e, "Failed to send hardware command");
        }
    }
}
