//! 交易会话
//!
//! 进程内只有一个会话，由编排器独占持有，其他组件无法访问。

use std::collections::BTreeMap;
use std::fmt;

use super::ports::TransferReceipt;

/// 交易状态
///
/// 顺序即流程顺序：Idle < AddressIn < MoneyIn < TxInfo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// 等待开始，价格与健康轮询运行中
    #[default]
    Idle,
    /// 等待扫码地址
    AddressIn,
    /// 投币中
    MoneyIn,
    /// 转账中或转账失败待处理
    TxInfo,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AddressIn => write!(f, "addressin"),
            SessionState::MoneyIn => write!(f, "moneyin"),
            SessionState::TxInfo => write!(f, "txinfo"),
        }
    }
}

/// 当前交易的全部数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub state: SessionState,
    /// 收款地址（已规范化、已校验）
    pub address: String,
    /// 币种 -> 累计最小单位金额；BTreeMap 保证换算时的求和顺序固定
    pub balance: BTreeMap<String, u64>,
    /// 换算后的 piconero 金额
    pub xmr_amount: u64,
    pub last_error: Option<String>,
    pub receipt: Option<TransferReceipt>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空所有字段，回到 Idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 记入一笔投币
    pub fn credit(&mut self, currency: &str, amount: u64) {
        let entry = self.balance.entry(currency.to_string()).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// 是否处于交易中（轮询应暂停）
    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle
    }
}
