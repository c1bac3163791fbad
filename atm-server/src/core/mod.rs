//! 核心模块 - 服务器配置、状态、后台任务和错误定义
//!
//! # 模块结构
//!
//! - [`Config`] - 服务器配置
//! - [`ServerState`] - 处理器共享状态
//! - [`Server`] - 启动与关闭
//! - [`BackgroundTasks`] - 后台任务管理
//! - [`ServerError`] - 致命错误

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_router};
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
