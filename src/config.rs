use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 默认配置文件名（位于当前工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "scan-uploader.toml";

/// 首次运行时写入的默认配置
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Default scan-uploader.toml file
# Please put the values for your ThreadFix installation below
# as these are simple place holders
# NOTE: Full or relative paths can be used
#   so the example below looks for a directory called 'checkmarx'
#   in the same directory scan-uploader is run in.
watch_location = "checkmarx"
log_location = "log"

threadfix_url = "https://threadfix.example.com/threadfix"
threadfix_api_key = ""
"#;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监控目录，扫描结果文件放在这里
    pub watch_location: String,
    /// 日志目录
    pub log_location: String,
    /// 日志文件名
    pub log_file_name: String,
    /// 日志级别（RUST_LOG 优先）
    pub log_level: String,
    /// 同时上传的文件数量，1 表示顺序处理
    pub max_concurrent_uploads: usize,
    // --- ThreadFix 配置 ---
    pub threadfix_url: String,
    pub threadfix_api_key: String,
    /// 单次上传请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否接受自签名证书
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_location: "checkmarx".to_string(),
            log_location: "log".to_string(),
            log_file_name: "scan-uploader.log".to_string(),
            log_level: "info".to_string(),
            max_concurrent_uploads: 1,
            threadfix_url: String::new(),
            threadfix_api_key: String::new(),
            request_timeout_secs: 300,
            accept_invalid_certs: false,
        }
    }
}

impl Config {
    /// 配置文件路径：命令行第一个参数 > SCAN_UPLOADER_CONFIG > 默认文件名
    pub fn config_path() -> PathBuf {
        std::env::args()
            .nth(1)
            .or_else(|| std::env::var("SCAN_UPLOADER_CONFIG").ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// 读取配置文件并叠加环境变量
    ///
    /// 文件不存在时写入默认配置并返回 `ConfigError::DefaultCreated`，
    /// 调用方应提示用户修改后退出。不做校验，见 `validate`。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            write_default_config(path)?;
            return Err(ConfigError::DefaultCreated {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用 `lookup` 提供的值覆盖配置项，无法解析的值会被忽略
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            watch_location: lookup("WATCH_LOCATION").unwrap_or(self.watch_location),
            log_location: lookup("LOG_LOCATION").unwrap_or(self.log_location),
            log_file_name: lookup("LOG_FILE_NAME").unwrap_or(self.log_file_name),
            log_level: lookup("LOG_LEVEL").unwrap_or(self.log_level),
            max_concurrent_uploads: lookup("MAX_CONCURRENT_UPLOADS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.max_concurrent_uploads),
            threadfix_url: lookup("THREADFIX_URL").unwrap_or(self.threadfix_url),
            threadfix_api_key: lookup("THREADFIX_API_KEY").unwrap_or(self.threadfix_api_key),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.request_timeout_secs),
            accept_invalid_certs: lookup("ACCEPT_INVALID_CERTS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.accept_invalid_certs),
        }
    }

    /// 检查必填项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_location.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                field: "watch_location",
            });
        }
        if self.threadfix_url.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                field: "threadfix_url",
            });
        }
        if self.threadfix_api_key.is_empty() {
            warn!("threadfix_api_key 为空，上传请求可能会被拒绝");
        }
        Ok(())
    }

    /// 每批并发数，至少为 1
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_uploads.max(1)
    }

    pub fn watch_dir(&self) -> PathBuf {
        PathBuf::from(&self.watch_location)
    }

    pub fn log_file_path(&self) -> PathBuf {
        Path::new(&self.log_location).join(&self.log_file_name)
    }
}

/// 写入默认配置文件（仅所有者可读写）
fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let to_err = |source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(to_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(to_err)?;
    }

    Ok(())
}
