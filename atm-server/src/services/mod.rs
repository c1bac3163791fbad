//! 服务层 - 外部 HTTP 服务客户端
//!
//! - [`MoneroPayClient`] - 转账与健康检查，实现 `PaymentGateway`

pub mod moneropay;

pub use moneropay::MoneroPayClient;
