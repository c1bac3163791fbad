use kiosk_bus::BusError;
use shared::AppError;
use thiserror::Error;

/// 启动与运行期的致命错误
///
/// 运行中的业务错误（转账失败、地址无效等）只通知前端，不会到这里
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("启动失败: {0}")]
    Startup(#[from] AppError),

    #[error("硬件总线错误: {0}")]
    Bus(#[from] BusError),

    #[error("网络监听错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_conversions() {
        let err: ServerError = AppError::config("bad FEE").into();
        assert!(matches!(err, ServerError::Startup(ref e) if e.code == ErrorCode::ConfigError));
        assert!(err.to_string().contains("bad FEE"));

        let err: ServerError = BusError::InvalidConfig("empty broker host".into()).into();
        assert!(matches!(err, ServerError::Bus(_)));
    }
}
