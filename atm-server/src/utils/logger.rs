//! Logging Infrastructure
//!
//! Structured logging for the kiosk backend
//! Features:
//! - Console output, pretty for development or JSON for production
//! - Daily rotating application logs (deleted after 14 days)
//! - Permanent audit logs of every payout attempt (never deleted)

use std::fs;
use std::path::{Path, PathBuf};
use tracing::Metadata;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Target used by [`audit_log!`](crate::audit_log)
pub const AUDIT_TARGET: &str = "audit";

/// Application logs older than this are removed by the cleanup task
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync>;

/// Initialize the logging system with daily rotating logs
///
/// # Arguments
/// * `level` - Log level or filter directive (e.g., "info", "atm_server=debug")
/// * `json_format` - Whether to use JSON format (true for production)
/// * `log_dir` - Optional directory for file logging, gets `app/` and `audit/` subdirectories
///
/// Must be called from inside the tokio runtime when `log_dir` is set.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    // Audit records always pass, whatever the configured level
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("{level},{AUDIT_TARGET}=info"))?,
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer(json_format)];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let audit_log_dir = log_dir.join("audit");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&audit_log_dir)?;

        layers.push(file_layer(json_format, daily_appender(&app_log_dir, "app")?, |meta| {
            meta.target() != AUDIT_TARGET
        }));
        layers.push(file_layer(
            json_format,
            daily_appender(&audit_log_dir, "audit")?,
            |meta| meta.target() == AUDIT_TARGET,
        ));

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

fn console_layer(json_format: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    if json_format {
        layer
            .json()
            .with_current_span(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        layer.boxed()
    }
}

fn file_layer(
    json_format: bool,
    appender: RollingFileAppender,
    keep: fn(&Metadata<'_>) -> bool,
) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender));
    if json_format {
        layer.json().with_filter(filter_fn(keep)).boxed()
    } else {
        layer.with_filter(filter_fn(keep)).boxed()
    }
}

/// `<prefix>.YYYY-MM-DD.log`, rotated at midnight
fn daily_appender(dir: &Path, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)?)
}

/// Clean up application log files older than `retention_days`
///
/// Only `app/` is touched; audit files are kept forever. Returns the number
/// of files removed.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(retention_days);
    let mut removed = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // Match app.YYYY-MM-DD.log pattern
        let Some(date_part) = name
            .strip_prefix("app.")
            .and_then(|d| d.strip_suffix(".log"))
        else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(removed)
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir, APP_LOG_RETENTION_DAYS) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let audit = dir.path().join("audit");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&audit).unwrap();

        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        fs::write(app.join("app.2000-01-01.log"), "old").unwrap();
        fs::write(app.join(format!("app.{today}.log")), "new").unwrap();
        fs::write(app.join("notes.txt"), "keep").unwrap();
        fs::write(audit.join("audit.2000-01-01.log"), "keep").unwrap();

        let removed = cleanup_old_logs(dir.path(), APP_LOG_RETENTION_DAYS).unwrap();

        assert_eq!(removed, 1);
        assert!(!app.join("app.2000-01-01.log").exists());
        assert!(app.join(format!("app.{today}.log")).exists());
        assert!(app.join("notes.txt").exists());
        assert!(audit.join("audit.2000-01-01.log").exists());
    }

    #[test]
    fn test_cleanup_without_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path(), 14).unwrap(), 0);
    }
}
