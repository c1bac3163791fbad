//! 前端 websocket 协议
//!
//! 入站: `{"event": "start"}`
//!
//! 出站: `{"event": "price", "value": {...}, "timestamp": "2024-05-01T10:00:00Z"}`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DecodeError;
use super::hardware::MoneyInData;

/// 前端命令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiCommand {
    /// 用户点击开始
    Start,
    /// 地址确认，进入投币
    MoneyIn,
    /// 投币结束，请求转账
    TxInfo,
    /// 取消交易
    Cancel,
    /// 交易结束页关闭
    Final,
}

/// 入站消息外壳，其余字段忽略
#[derive(Debug, Deserialize)]
struct UiRequest {
    event: UiCommand,
}

impl UiCommand {
    /// 从 websocket 文本帧解码
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let request: UiRequest = serde_json::from_str(text)?;
        Ok(request.event)
    }
}

/// 单个币种的 XMR 价格（已含手续费）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XmrPrice {
    pub amount: f64,
    pub short: String,
}

/// 价格快照 - 一次轮询覆盖全部配置币种
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub currencies: Vec<XmrPrice>,
}

/// 转账成功信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInfoData {
    /// 交易哈希
    pub tx: String,
    /// 十进制 XMR 金额（12 位小数）
    pub amount: String,
}

/// 出站通知
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "value")]
pub enum Notification {
    #[serde(rename = "addressin")]
    AddressIn(String),
    #[serde(rename = "moneyin")]
    MoneyIn(MoneyInData),
    #[serde(rename = "price")]
    Price(PriceSnapshot),
    #[serde(rename = "mpay_health")]
    MpayHealth(bool),
    #[serde(rename = "txinfo")]
    TxInfo(TxInfoData),
    #[serde(rename = "error")]
    Error(String),
}

impl Notification {
    /// 事件名（日志用）
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::AddressIn(_) => "addressin",
            Notification::MoneyIn(_) => "moneyin",
            Notification::Price(_) => "price",
            Notification::MpayHealth(_) => "mpay_health",
            Notification::TxInfo(_) => "txinfo",
            Notification::Error(_) => "error",
        }
    }
}

/// 带时间戳的出站帧
#[derive(Debug, Clone, Serialize)]
pub struct Update {
    #[serde(flatten)]
    pub notification: Notification,
    pub timestamp: DateTime<Utc>,
}

impl Update {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            timestamp: Utc::now(),
        }
    }

    /// 序列化为 websocket 文本帧
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
