//! 硬件总线协议
//!
//! 守护进程发布的事件外壳:
//!
//! ```json
//! {"event": "codescan", "data": {"scan": "NDhBQ..."}}
//! {"event": "moneyin",  "data": {"currency": "EUR", "amount": 500}}
//! ```
//!
//! 指令发往以服务名命名的 topic，见 [`HardwareService`]。

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::DecodeError;

/// 硬件服务（指令的目标 topic）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareService {
    /// 扫码器
    CodeScanner,
    /// 纸币识别器
    MoneyAcceptor,
}

impl HardwareService {
    pub fn topic(&self) -> &'static str {
        match self {
            HardwareService::CodeScanner => "codescannerd",
            HardwareService::MoneyAcceptor => "moneyacceptord",
        }
    }
}

impl fmt::Display for HardwareService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// 投币数据（最小货币单位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyInData {
    pub currency: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
struct ScanData {
    scan: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// 已解码的硬件事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareEvent {
    /// 扫码结果（已完成 base64 解码的原始文本）
    CodeScan(String),
    /// 投入纸币
    MoneyIn(MoneyInData),
}

impl HardwareEvent {
    /// 解码总线 payload
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let envelope: Envelope = serde_json::from_slice(payload)?;
        match envelope.event.as_str() {
            "codescan" => {
                let data: ScanData = serde_json::from_value(envelope.data)?;
                let raw = STANDARD.decode(data.scan.trim())?;
                Ok(HardwareEvent::CodeScan(String::from_utf8(raw)?))
            }
            "moneyin" => {
                let data: MoneyInData = serde_json::from_value(envelope.data)?;
                Ok(HardwareEvent::MoneyIn(data))
            }
            other => Err(DecodeError::UnsupportedEvent(other.to_string())),
        }
    }

    /// 事件名（日志用）
    pub fn kind(&self) -> &'static str {
        match self {
            HardwareEvent::CodeScan(_) => "codescan",
            HardwareEvent::MoneyIn(_) => "moneyin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_codescan() {
        let scan = STANDARD.encode("monero:4abc?tx_amount=1");
        let payload = format!(r#"{{"event":"codescan","data":{{"scan":"{scan}"}}}}"#);
        let event = HardwareEvent::decode(payload.as_bytes()).unwrap();
        assert_eq!(event, HardwareEvent::CodeScan("monero:4abc?tx_amount=1".to_string()));
    }

    #[test]
    fn test_decode_moneyin() {
        let payload = br#"{"event":"moneyin","data":{"currency":"EUR","amount":500}}"#;
        let event = HardwareEvent::decode(payload).unwrap();
        assert_eq!(
            event,
            HardwareEvent::MoneyIn(MoneyInData {
                currency: "EUR".to_string(),
                amount: 500,
            })
        );
    }

    #[test]
    fn test_decode_bad_base64() {
        let payload = br#"{"event":"codescan","data":{"scan":"%%%"}}"#;
        assert!(matches!(
            HardwareEvent::decode(payload),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_negative_amount_is_malformed() {
        let payload = br#"{"event":"moneyin","data":{"currency":"EUR","amount":-5}}"#;
        assert!(matches!(HardwareEvent::decode(payload), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_unknown_kind() {
        let payload = br#"{"event":"status","data":{"ok":true}}"#;
        assert!(matches!(
            HardwareEvent::decode(payload),
            Err(DecodeError::UnsupportedEvent(kind)) if kind == "status"
        ));
    }

    #[test]
    fn test_service_topics() {
        assert_eq!(HardwareService::CodeScanner.topic(), "codescannerd");
        assert_eq!(HardwareService::MoneyAcceptor.to_string(), "moneyacceptord");
    }
}
