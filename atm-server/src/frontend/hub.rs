//! FrontendHub - 当前前端连接的登记处
//!
//! 取款机只有一块屏幕：新连接直接替换旧连接，旧连接的写出通道随之关闭。
//! 编排器通过 [`FrontendNotifier`] 发送通知；没有前端连接时，
//! 最多等待 `ready_timeout`，超时则丢弃并记录日志。

use async_trait::async_trait;
use shared::{Notification, Update};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use crate::orchestrator::ports::FrontendNotifier;

/// 单个连接的写出缓冲
const OUTBOUND_BUFFER: usize = 32;

#[derive(Debug, Clone)]
struct Connection {
    id: u64,
    tx: mpsc::Sender<String>,
}

/// 前端连接登记处
#[derive(Debug)]
pub struct FrontendHub {
    current: watch::Sender<Option<Connection>>,
    next_id: AtomicU64,
    ready_timeout: Duration,
}

impl FrontendHub {
    pub fn new(ready_timeout: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            next_id: AtomicU64::new(1),
            ready_timeout,
        }
    }

    /// 登记新连接，返回连接 ID 和写出队列
    ///
    /// 之前的连接被替换，其队列关闭后写出任务自然退出
    pub fn attach(&self) -> (u64, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        if let Some(old) = self.current.send_replace(Some(Connection { id, tx })) {
            tracing::warn!(old = old.id, new = id, "Frontend connection replaced");
        }
        (id, rx)
    }

    /// 注销连接；已被替换的连接不影响当前连接
    pub fn detach(&self, id: u64) {
        self.current.send_if_modified(|current| match current {
            Some(conn) if conn.id == id => {
                *current = None;
                true
            }
            _ => false,
        });
    }

    pub fn is_connected(&self) -> bool {
        self.current.borrow().is_some()
    }

    async fn wait_for_connection(&self) -> Option<mpsc::Sender<String>> {
        let mut rx = self.current.subscribe();
        match tokio::time::timeout(self.ready_timeout, rx.wait_for(Option::is_some)).await {
            Ok(Ok(current)) => {
                let current: &Option<Connection> = &current;
                current.as_ref().map(|c| c.tx.clone())
            }
            _ => None,
        }
    }
}

#[async_trait]
impl FrontendNotifier for FrontendHub {
    async fn notify(&self, notification: Notification) {
        let event = notification.event_name();
        let frame = match Update::new(notification).to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(event, error = %e, "Failed to encode frontend update");
                return;
            }
        };

        let Some(tx) = self.wait_for_connection().await else {
            tracing::warn!(event, timeout = ?self.ready_timeout, "No frontend connected, update dropped");
            return;
        };

        if tx.send(frame).await.is_err() {
            tracing::warn!(event, "Frontend disconnected, update dropped");
        }
    }
}
