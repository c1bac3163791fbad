use shared::{AppError, AppResult};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::validation::Network;

/// 服务器配置 - 取款机后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖，格式错误的值会导致启动失败：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | BIND_ADDR | 127.0.0.1:8080 | 前端 websocket 监听地址 |
/// | NETWORK | mainnet | mainnet / stagenet，决定地址前缀 |
/// | CURRENCIES | EUR | 逗号分隔的法币代码 |
/// | FEE | 0.0 | 手续费比例 (0.05 = 5%) |
/// | MONEROPAY_URL | http://localhost:5000 | MoneroPay 服务地址 |
/// | MONEROPAY_TIMEOUT_MS | 60000 | 转账与健康检查超时 |
/// | PRICE_POLL_INTERVAL_MS | 60000 | 价格轮询间隔 |
/// | HEALTH_POLL_INTERVAL_MS | 10000 | 健康轮询间隔 |
/// | KRAKEN_URL | https://api.kraken.com | 行情源 |
/// | ECB_URL | ECB eurofxref-daily.xml | 欧元交叉汇率源 |
/// | FIAT_RATES | - | 手动交叉汇率，如 `GBP=0.85,CHF=0.94` |
/// | MQTT_HOST | localhost | 硬件总线地址 |
/// | MQTT_PORT | 1883 | 硬件总线端口 |
/// | MQTT_CLIENT_ID | atm-server | MQTT 客户端 ID |
/// | MQTT_TOPICS | events | 守护进程事件主题 |
/// | BUS_READY_TIMEOUT_MS | 5000 | 发送指令前等待总线连接 |
/// | UI_READY_TIMEOUT_MS | 3000 | 发送通知前等待前端连接 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志 |
/// | LOG_DIR | - | 日志文件目录 |
///
/// # 示例
///
/// ```ignore
/// NETWORK=stagenet CURRENCIES=EUR,USD FEE=0.05 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 前端连接的监听地址
    pub bind_addr: String,
    /// 目标网络
    pub network: Network,
    /// 报价币种（大写）
    pub currencies: Vec<String>,
    /// 手续费比例
    pub fee: f64,

    // === 支付服务 ===
    pub moneropay_url: String,
    pub moneropay_timeout: Duration,

    // === 轮询 ===
    pub price_poll_interval: Duration,
    pub health_poll_interval: Duration,

    // === 行情源 ===
    pub kraken_url: String,
    pub ecb_url: String,
    /// 手动指定的交叉汇率，设置后不再请求 ECB
    pub fiat_rates: Option<HashMap<String, f64>>,

    // === 硬件总线 ===
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_client_id: String,
    pub mqtt_topics: Vec<String>,
    pub bus_ready_timeout: Duration,

    /// 通知等待前端连接的最长时间
    pub ui_ready_timeout: Duration,

    // === 日志 ===
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值；设置了但无法解析的变量返回 ConfigError
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 常用于测试场景
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let fee: f64 = parse(&lookup, "FEE", 0.0)?;
        if !(0.0..1.0).contains(&fee) {
            return Err(AppError::config(format!("FEE must be in [0, 1), got {fee}")));
        }

        let currencies = split_list(&var("CURRENCIES", "EUR"))
            .into_iter()
            .map(|c| c.to_uppercase())
            .collect::<Vec<_>>();
        if currencies.is_empty() {
            return Err(AppError::config("CURRENCIES must name at least one currency"));
        }

        let fiat_rates = match lookup("FIAT_RATES") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_fiat_rates(&raw)?),
            _ => None,
        };

        let mqtt_topics = split_list(&var("MQTT_TOPICS", "events"));
        if mqtt_topics.is_empty() {
            return Err(AppError::config("MQTT_TOPICS must name at least one topic"));
        }

        Ok(Self {
            bind_addr: var("BIND_ADDR", "127.0.0.1:8080"),
            network: parse(&lookup, "NETWORK", Network::Mainnet)?,
            currencies,
            fee,

            moneropay_url: var("MONEROPAY_URL", "http://localhost:5000"),
            moneropay_timeout: millis(&lookup, "MONEROPAY_TIMEOUT_MS", 60_000)?,

            price_poll_interval: millis(&lookup, "PRICE_POLL_INTERVAL_MS", 60_000)?,
            health_poll_interval: millis(&lookup, "HEALTH_POLL_INTERVAL_MS", 10_000)?,

            kraken_url: var("KRAKEN_URL", "https://api.kraken.com"),
            ecb_url: var(
                "ECB_URL",
                "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml",
            ),
            fiat_rates,

            mqtt_host: var("MQTT_HOST", "localhost"),
            mqtt_port: parse(&lookup, "MQTT_PORT", 1883)?,
            mqtt_client_id: var("MQTT_CLIENT_ID", "atm-server"),
            mqtt_topics,
            bus_ready_timeout: millis(&lookup, "BUS_READY_TIMEOUT_MS", 5_000)?,

            ui_ready_timeout: millis(&lookup, "UI_READY_TIMEOUT_MS", 3_000)?,

            log_level: var("LOG_LEVEL", "info"),
            log_json: parse(&lookup, "LOG_JSON", false)?,
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
        })
    }

    /// 需要交叉汇率的币种（Kraken 只直接报价 EUR 和 USD）
    pub fn cross_currencies(&self) -> Vec<String> {
        self.currencies
            .iter()
            .filter(|c| !matches!(c.as_str(), "EUR" | "USD"))
            .cloned()
            .collect()
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("invalid {key}={raw:?}: {e}"))),
    }
}

fn millis<F>(lookup: &F, key: &str, default: u64) -> AppResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let ms: u64 = parse(lookup, key, default)?;
    if ms == 0 {
        return Err(AppError::config(format!("{key} must be greater than zero")));
    }
    Ok(Duration::from_millis(ms))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `GBP=0.85,CHF=0.94` -> {GBP: 0.85, CHF: 0.94}
fn parse_fiat_rates(raw: &str) -> AppResult<HashMap<String, f64>> {
    let mut rates = HashMap::new();
    for pair in split_list(raw) {
        let (currency, rate) = pair
            .split_once('=')
            .ok_or_else(|| AppError::config(format!("invalid FIAT_RATES entry {pair:?}")))?;
        let rate: f64 = rate
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("invalid FIAT_RATES rate {pair:?}: {e}")))?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AppError::config(format!(
                "FIAT_RATES rate must be positive: {pair:?}"
            )));
        }
        rates.insert(currency.trim().to_uppercase(), rate);
    }
    Ok(rates)
}
