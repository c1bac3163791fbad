//! 后台任务管理
//!
//! 服务器的四个常驻任务都挂在同一个 [`CancellationToken`] 下：
//!
//! | 任务 | 类型 |
//! |------|------|
//! | orchestrator | [`TaskKind::Worker`] |
//! | hardware_listener | [`TaskKind::Listener`] |
//! | price_poller / health_poller | [`TaskKind::Periodic`] |
//!
//! Ctrl+C 后 [`BackgroundTasks::shutdown`] 取消令牌并等待全部退出。

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 事件循环
    Worker,
    /// 总线监听
    Listener,
    /// 定时轮询
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskKind::Worker => "Worker",
            TaskKind::Listener => "Listener",
            TaskKind::Periodic => "Periodic",
        })
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 任务内部监听 shutdown 用的令牌
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 启动任务；panic 被捕获并记录，不会带走整个进程
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if token.is_cancelled() => {
                    tracing::debug!(task = %name, kind = %kind, "Background task stopped");
                }
                Ok(()) => {
                    tracing::warn!(task = %name, kind = %kind, "Background task exited before shutdown");
                }
                Err(payload) => {
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_message(payload.as_ref()),
                        "Background task panicked"
                    );
                }
            }
        });

        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    /// 打印任务摘要
    pub fn log_summary(&self) {
        let count = |kind: TaskKind| self.tasks.iter().filter(|t| t.kind == kind).count();
        tracing::info!(
            total = self.tasks.len(),
            worker = count(TaskKind::Worker),
            listener = count(TaskKind::Listener),
            periodic = count(TaskKind::Periodic),
            "Background tasks registered"
        );
    }

    /// 取消所有任务并等待退出
    pub async fn shutdown(self) {
        tracing::info!(count = self.tasks.len(), "Stopping background tasks");
        self.shutdown.cancel();

        for task in self.tasks {
            if let Err(e) = task.handle.await {
                tracing::error!(task = %task.name, error = ?e, "Background task join failed");
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_shutdown_cancels_tasks() {
        let mut tasks = BackgroundTasks::new();
        let stopped = Arc::new(AtomicBool::new(false));

        let token = tasks.shutdown_token();
        let flag = stopped.clone();
        tasks.spawn("orchestrator", TaskKind::Worker, async move {
            token.cancelled().await;
            flag.store(true, Ordering::SeqCst);
        });
        let token = tasks.shutdown_token();
        tasks.spawn("price_poller", TaskKind::Periodic, async move {
            token.cancelled().await;
        });
        tasks.log_summary();

        tasks.shutdown().await;
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        tasks.spawn("hardware_listener", TaskKind::Listener, async {
            panic!("listener failed");
        });
        tasks.spawn("health_poller", TaskKind::Periodic, async move {
            token.cancelled().await;
        });

        // Shutdown still joins cleanly: the panic never escapes the wrapper
        tokio::time::timeout(std::time::Duration::from_secs(5), tasks.shutdown())
            .await
            .unwrap();
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
