//! 后台轮询 - 价格与 MoneroPay 健康状态
//!
//! 两个轮询器各自独立运行，交易期间由编排器暂停。
//!
//! # 暂停信号
//!
//! 暂停/恢复是一个 `watch` 标志：编排器写入立即返回，从不等待轮询器；
//! 轮询器在每次等待中同时竞争「下一个 tick」和「标志变化」，
//! 并在 tick 触发时再次检查标志，暂停期间不会执行任何请求。
//! 正在进行中的请求不会被中断，但也不会阻塞编排器。

pub mod health;
pub mod price;

pub use health::HealthPoller;
pub use price::PricePoller;

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// 暂停标志的写端（编排器持有）
#[derive(Debug, Clone)]
pub struct PauseSwitch(watch::Sender<bool>);

/// 暂停标志的读端（轮询器持有）
#[derive(Debug, Clone)]
pub struct PauseListener(watch::Receiver<bool>);

/// 创建一对暂停标志，初始为运行状态
pub fn pause_channel() -> (PauseSwitch, PauseListener) {
    let (tx, rx) = watch::channel(false);
    (PauseSwitch(tx), PauseListener(rx))
}

impl PauseSwitch {
    pub fn pause(&self) {
        self.0.send_replace(true);
    }

    pub fn resume(&self) {
        self.0.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.0.borrow()
    }
}

impl PauseListener {
    pub fn is_paused(&self) -> bool {
        *self.0.borrow()
    }

    /// 等待标志变化；写端已丢弃时返回 false
    pub async fn changed(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}

/// 编排器对两个轮询器的控制
#[derive(Debug, Clone)]
pub struct PollerControl {
    pub price: PauseSwitch,
    pub health: PauseSwitch,
}

impl PollerControl {
    pub fn new(price: PauseSwitch, health: PauseSwitch) -> Self {
        Self { price, health }
    }

    pub fn pause_all(&self) {
        self.price.pause();
        self.health.pause();
    }

    pub fn resume_all(&self) {
        self.price.resume();
        self.health.resume();
    }
}

/// 一个周期性动作
#[async_trait]
pub trait PeriodicJob: Send {
    /// 日志中的名称
    fn name(&self) -> &'static str;

    async fn run_once(&mut self);
}

/// 轮询主循环
///
/// 第一次动作在一个完整间隔之后执行。
pub async fn run_periodic<J: PeriodicJob>(
    mut job: J,
    interval: Duration,
    mut pause: PauseListener,
    shutdown: CancellationToken,
) {
    let name = job.name();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    tracing::info!(poller = name, interval = ?interval, "Poller started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!(poller = name, "Poller received shutdown signal");
                break;
            }
            alive = pause.changed() => {
                if !alive {
                    tracing::info!(poller = name, "Pause switch dropped, poller stopping");
                    break;
                }
                tracing::debug!(poller = name, paused = pause.is_paused(), "Pause state changed");
            }
            _ = ticker.tick() => {
                if pause.is_paused() {
                    continue;
                }
                job.run_once().await;
            }
        }
    }
}
