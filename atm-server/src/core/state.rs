use std::sync::Arc;
use tokio::sync::mpsc;

use shared::UiCommand;

use crate::frontend::FrontendHub;
use crate::orchestrator::HardwareCommander;

/// 服务器状态 - HTTP/websocket 处理器共享的引用
///
/// 会话本身不在这里：它只属于编排器任务。处理器只能把前端命令
/// 投递到 `ui_tx`，或者通过 `hardware` 启动扫码器。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | frontend | Arc<FrontendHub> | 当前前端连接 |
/// | hardware | Arc<dyn HardwareCommander> | 硬件指令 |
/// | ui_tx | mpsc::Sender<UiCommand> | 前端命令 -> 编排器 |
#[derive(Clone)]
pub struct ServerState {
    pub frontend: Arc<FrontendHub>,
    pub hardware: Arc<dyn HardwareCommander>,
    pub ui_tx: mpsc::Sender<UiCommand>,
}

impl ServerState {
    pub fn new(
        frontend: Arc<FrontendHub>,
        hardware: Arc<dyn HardwareCommander>,
        ui_tx: mpsc::Sender<UiCommand>,
    ) -> Self {
        Self {
            frontend,
            hardware,
            ui_tx,
        }
    }
}
