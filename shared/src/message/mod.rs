//! 消息类型定义
//!
//! 这些类型在 atm-server 与前端、硬件守护进程之间共享：
//!
//! - [`ui`] - 前端 websocket 协议（入站命令，出站通知）
//! - [`hardware`] - 硬件总线协议（扫码、投币事件，start/stop 指令）
//!
//! 所有字符串判别字段都在边界处一次性解码为封闭的枚举，
//! 状态机只接触类型化的事件。

use thiserror::Error;

pub mod hardware;
pub mod ui;

pub use hardware::{HardwareEvent, HardwareService, MoneyInData};
pub use ui::{Notification, PriceSnapshot, TxInfoData, UiCommand, Update, XmrPrice};

/// 边界解码错误
#[derive(Debug, Error)]
pub enum DecodeError {
    /// JSON 结构无法解析
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// 扫码数据不是合法的 base64
    #[error("invalid base64 scan payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// 扫码数据不是 UTF-8 文本
    #[error("scan payload is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// 未知的事件类型（其他守护进程的事件）
    #[error("unsupported event kind: {0}")]
    UnsupportedEvent(String),
}
