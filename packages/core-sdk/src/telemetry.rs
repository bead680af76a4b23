use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::Result;
use once_cell::sync::Lazy;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

const LOG_FILE: &str = "zenchat.log";

#[derive(Debug, Default)]
struct TelemetryState {
    log_dir: Option<PathBuf>,
}

static TELEMETRY: Lazy<RwLock<TelemetryState>> =
    Lazy::new(|| RwLock::new(TelemetryState::default()));

/**
 * \brief 设置事件日志目录；传入 None 关闭文件日志。
 */
pub fn init(log_dir: Option<&Path>) {
    if let Ok(mut guard) = TELEMETRY.write() {
        guard.log_dir = log_dir.map(Path::to_path_buf);
    }
}

/**
 * \brief 是否正在写入事件日志文件。
 */
pub fn is_enabled() -> bool {
    TELEMETRY
        .read()
        .map(|g| g.log_dir.is_some())
        .unwrap_or(false)
}

/**
 * \brief 记录常规事件。
 */
pub fn log_event(category: &str, message: &str) {
    tracing::info!(category = category, "{}", message);
    append("INFO", category, message);
}

/**
 * \brief 记录可由客户端自行修正的问题。
 */
pub fn log_warn(category: &str, message: &str) {
    tracing::warn!(category = category, "{}", message);
    append("WARN", category, message);
}

/**
 * \brief 记录错误事件。
 */
pub fn log_error(category: &str, message: &str) {
    tracing::error!(category = category, "{}", message);
    append("ERROR", category, message);
}

fn append(level: &str, category: &str, message: &str) {
    let dir = match TELEMETRY.read() {
        Ok(guard) => guard.log_dir.clone(),
        Err(_) => None,
    };
    let Some(dir) = dir else {
        return;
    };
    if let Err(err) = write_line(&dir, level, category, message) {
        tracing::warn!("telemetry write failed: {}", err);
    }
}

fn write_line(log_dir: &Path, level: &str, category: &str, message: &str) -> Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))?;
    writeln!(file, "{} [{}] {} - {}", timestamp, level, category, message)?;
    Ok(())
}
