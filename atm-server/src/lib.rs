//! ATM Server - 门罗币现金取款机的控制后端
//!
//! # 架构概述
//!
//! 一个编排器任务独占交易会话，汇聚四路输入：
//!
//! - **前端** (`frontend`): 取款机屏幕的 websocket 命令
//! - **硬件** (`hardware`): MQTT 总线上的扫码与投币事件
//! - **价格** (`pollers::price`): Kraken + ECB 报价
//! - **健康** (`pollers::health`): MoneroPay 健康探测
//!
//! 并通过 MoneroPay (`services`) 完成转账。
//!
//! # 模块结构
//!
//! ```text
//! atm-server/src/
//! ├── core/          # 配置、状态、后台任务、错误
//! ├── orchestrator/  # 交易状态机、会话、换算
//! ├── pollers/       # 可暂停的价格与健康轮询
//! ├── pricing/       # Kraken 报价、ECB 交叉汇率
//! ├── services/      # MoneroPay 客户端
//! ├── frontend/      # websocket 连接
//! ├── hardware/      # 总线指令与事件监听
//! └── utils/         # 日志、地址校验
//! ```

pub mod core;
pub mod frontend;
pub mod hardware;
pub mod orchestrator;
pub mod pollers;
pub mod pricing;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use orchestrator::{Orchestrator, Session, SessionState};
pub use shared::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Audit log helper - records every payout attempt
///
/// Audit logs are stored under `<LOG_DIR>/audit/` and are never deleted.
///
/// # Examples
/// ```ignore
/// audit_log!("transfer", address, "0.500000000000", "tx=abc123");
/// audit_log!("transfer_failed", address, "0.500000000000", "not enough money");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($action:expr, $address:expr, $amount:expr) => {
        tracing::info!(
            target: "audit",
            action = $action,
            address = %$address,
            amount = %$amount,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($action:expr, $address:expr, $amount:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            action = $action,
            address = %$address,
            amount = %$amount,
            details = %$details,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ___  ________  ___
   /   |/_  __/  |/  /
  / /| | / / / /|_/ /
 / ___ |/ / / /  / /
/_/  |_/_/ /_/  /_/   cash -> XMR
    "#
    );
}
