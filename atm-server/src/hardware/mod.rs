//! 硬件模块 - 总线上的扫码器与纸币识别器
//!
//! - [`BusCommander`] - start/stop 指令，实现 `HardwareCommander`
//! - [`HardwareListener`] - 接收并解码守护进程事件

pub mod dispatcher;
pub mod listener;

pub use dispatcher::BusCommander;
pub use listener::HardwareListener;
