//! 日志系统模块职责：
//! 1. 初始化 stdout + 文件双通道 tracing 日志。
//! 2. 将运行日志按天落在 `logs/raw` 目录。
//! 3. 定期清理超过保留天数的历史日志文件。

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// 默认日志根目录（相对当前工作目录）。
const DEFAULT_LOG_DIR: &str = "logs";
/// 日志原始文件目录名。
const RAW_DIR_NAME: &str = "raw";
/// 清理任务轮询周期（秒）。
const PRUNE_INTERVAL_SEC: u64 = 3600;
/// 默认保留天数。
const DEFAULT_RETENTION_DAYS: i64 = 7;
/// 文件日志级别环境变量（独立于 `RUST_LOG`）。
const FILE_LOG_LEVEL_ENV: &str = "TG_FILE_LOG_LEVEL";
/// 保留天数环境变量。
const RETENTION_DAYS_ENV: &str = "TG_LOG_RETENTION_DAYS";
/// stdout 默认日志过滤。
const DEFAULT_STDOUT_FILTER: &str = "info";

/// 日志运行时守卫，防止 non-blocking writer 提前析构。
pub struct LogRuntime {
    _stdout_guard: WorkerGuard,
    _file_guard: WorkerGuard,
    _pruner: JoinHandle<()>,
}

/// 初始化日志系统，并启动历史日志清理任务。需在 tokio runtime 内调用。
pub fn init(service_name: &str) -> Result<LogRuntime> {
    let raw_dir = resolve_log_root().join(RAW_DIR_NAME);
    fs::create_dir_all(&raw_dir)
        .with_context(|| format!("create raw log dir: {}", raw_dir.display()))?;

    let retention_days = retention_days(std::env::var(RETENTION_DAYS_ENV).ok().as_deref());
    prune_expired_logs(&raw_dir, retention_days)?;

    let file_appender = tracing_appender::rolling::daily(&raw_dir, format!("{service_name}.log"));
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_STDOUT_FILTER));
    let file_filter = file_level_filter(std::env::var(FILE_LOG_LEVEL_ENV).ok().as_deref());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(stdout_writer)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(stdout_filter);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;

    let pruner = spawn_prune_task(raw_dir, retention_days);
    Ok(LogRuntime {
        _stdout_guard: stdout_guard,
        _file_guard: file_guard,
        _pruner: pruner,
    })
}

/// 文件日志级别；默认 `debug`，保证日志文件可完整回放。
fn file_level_filter(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::DEBUG)
}

/// 保留天数；非法或非正数回退默认值。
fn retention_days(raw: Option<&str>) -> i64 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_RETENTION_DAYS)
}

/// 将环境变量中的日志路径解析成绝对路径。
fn resolve_log_root() -> PathBuf {
    let raw = std::env::var("TG_LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(dir) => dir.join(path),
        Err(_) => PathBuf::from(DEFAULT_LOG_DIR),
    }
}

/// 启动后台清理任务。
fn spawn_prune_task(raw_dir: PathBuf, retention_days: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(PRUNE_INTERVAL_SEC));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(err) = prune_expired_logs(&raw_dir, retention_days) {
                warn!("prune logs failed: {err}");
            }
        }
    })
}

/// 删除日期早于保留窗口的日志文件。
fn prune_expired_logs(raw_dir: &Path, retention_days: i64) -> Result<()> {
    if !raw_dir.exists() {
        return Ok(());
    }
    let today = Local::now().date_naive();

    for entry in
        fs::read_dir(raw_dir).with_context(|| format!("read raw logs: {}", raw_dir.display()))?
    {
        let entry = entry.with_context(|| format!("read entry under {}", raw_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(day) = path
            .file_name()
            .and_then(|value| value.to_str())
            .and_then(extract_day_from_log_name)
        else {
            continue;
        };
        if is_expired(day, today, retention_days) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed expired log {}", path.display()),
                Err(err) => warn!("remove expired log {} failed: {err}", path.display()),
            }
        }
    }
    Ok(())
}

/// 从日志文件名中提取日期（`<service>.log.YYYY-MM-DD`）。
fn extract_day_from_log_name(file_name: &str) -> Option<NaiveDate> {
    let day = file_name.rsplit('.').next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// 日志日期是否已超出保留窗口。
fn is_expired(day: NaiveDate, today: NaiveDate, retention_days: i64) -> bool {
    (today - day).num_days() >= retention_days
}
