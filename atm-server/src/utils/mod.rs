//! 工具模块 - 日志与输入校验
//!
//! - [`logger`] - tracing 初始化、日志清理
//! - [`validation`] - 门罗币地址规范化与校验

pub mod logger;
pub mod validation;

pub use validation::{AddressError, Network, normalize_address, validate_address};
