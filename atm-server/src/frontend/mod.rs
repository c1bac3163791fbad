//! 前端模块 - 取款机屏幕的 websocket 连接
//!
//! - [`FrontendHub`] - 当前连接登记，实现 `FrontendNotifier`
//! - [`ws`] - `/ws` 升级与读写循环

pub mod hub;
pub mod ws;

pub use hub::FrontendHub;
