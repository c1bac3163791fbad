use atm_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载配置 (.env 可选)
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 2. 日志
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    print_banner();
    tracing::info!(
        network = %config.network,
        currencies = ?config.currencies,
        fee = config.fee,
        moneropay = %config.moneropay_url,
        "🏧 ATM server starting..."
    );

    // 3. 启动服务器 (后台任务 + HTTP)
    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
