use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
/// 日志工具模块
///
/// 负责日志文件的初始化，以及启动信息的输出
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 以追加方式打开 `{log_location}/{log_file_name}`，写入本次运行的分隔头，
/// 然后把 tracing 输出全部写入该文件。级别由 RUST_LOG 决定，未设置时使用配置中的 `log_level`。
///
/// # 返回
/// 返回日志文件路径
pub fn init(config: &Config) -> AppResult<PathBuf> {
    let log_path = config.log_file_path();
    let to_err = |source| {
        AppError::File(FileError::LogFileFailed {
            path: log_path.clone(),
            source,
        })
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(to_err)?;

    file.write_all(log_header().as_bytes()).map_err(to_err)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| AppError::logging(format!("无效的日志级别 {}: {}", config.log_level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::logging(e.to_string()))?;

    Ok(log_path)
}

fn log_header() -> String {
    format!(
        "{}\nscan-uploader 日志 - {}\n{}\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    )
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 scan-uploader 启动，版本 {}", env!("CARGO_PKG_VERSION"));
    info!("📁 监控目录: {}", config.watch_location);
    info!("🌐 ThreadFix: {}", config.threadfix_url);
    info!("📊 最大并发数: {}", config.concurrency());
    info!("{}", "=".repeat(60));
}
