//! Event Channels - 编排器的四路输入
//!
//! ```text
//! websocket reader ── mpsc ──┐
//! hardware listener ─ mpsc ──┤
//! price poller ────── mpsc ──┼──► Orchestrator (select!, 无优先级)
//! health poller ───── mpsc ──┘
//! ```
//!
//! 每个来源一条独立通道，编排器用非 biased 的 `tokio::select!` 同时等待，
//! 同时就绪时随机选择，不假设任何来源优先。

use shared::message::{HardwareEvent, PriceSnapshot, UiCommand};
use tokio::sync::mpsc;

/// 默认通道容量
pub const DEFAULT_BUFFER: usize = 16;

/// 编排器的一次输入
#[derive(Debug, Clone, PartialEq)]
pub enum KioskEvent {
    Ui(UiCommand),
    Hardware(HardwareEvent),
    Price(PriceSnapshot),
    Health(bool),
}

/// 发送端集合，按来源分发给各个生产者
#[derive(Debug, Clone)]
pub struct EventSenders {
    pub ui: mpsc::Sender<UiCommand>,
    pub hardware: mpsc::Sender<HardwareEvent>,
    pub price: mpsc::Sender<PriceSnapshot>,
    pub health: mpsc::Sender<bool>,
}

/// 接收端集合，编排器独占
pub struct EventChannels {
    pub ui_rx: mpsc::Receiver<UiCommand>,
    pub hardware_rx: mpsc::Receiver<HardwareEvent>,
    pub price_rx: mpsc::Receiver<PriceSnapshot>,
    pub health_rx: mpsc::Receiver<bool>,
}

/// 创建四路通道
pub fn event_channels(buffer: usize) -> (EventSenders, EventChannels) {
    let (ui, ui_rx) = mpsc::channel(buffer);
    let (hardware, hardware_rx) = mpsc::channel(buffer);
    let (price, price_rx) = mpsc::channel(buffer);
    let (health, health_rx) = mpsc::channel(buffer);

    (
        EventSenders {
            ui,
            hardware,
            price,
            health,
        },
        EventChannels {
            ui_rx,
            hardware_rx,
            price_rx,
            health_rx,
        },
    )
}

impl EventChannels {
    /// 等待任一来源的下一条事件
    ///
    /// 所有发送端都关闭后返回 None
    pub async fn recv(&mut self) -> Option<KioskEvent> {
        tokio::select! {
            Some(cmd) = self.ui_rx.recv() => Some(KioskEvent::Ui(cmd)),
            Some(event) = self.hardware_rx.recv() => Some(KioskEvent::Hardware(event)),
            Some(snapshot) = self.price_rx.recv() => Some(KioskEvent::Price(snapshot)),
            Some(healthy) = self.health_rx.recv() => Some(KioskEvent::Health(healthy)),
            else => None,
        }
    }
}
