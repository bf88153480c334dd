use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件名无法解析出 AppID
    #[error("文件名错误: {0}")]
    Name(#[from] NameError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 日志初始化失败
    #[error("日志错误: {0}")]
    Logging(String),
}

/// 文件名解析错误
///
/// 文件名约定为 `{AppID}_[App Name]...`，例如 `12_[Foo].Foo-28.4.2015-16.20.41.xml`
#[derive(Debug, Error)]
pub enum NameError {
    /// 没有 `[`，或 `[` 之前没有足够的字符
    #[error(
        "文件名格式错误 ({name}): 未找到 \"[\" - 文件名应以 {{AppID}}_[App Name] 开头，例如 12_[Foo].Foo-28.4.2015-16.20.41.xml"
    )]
    MalformedName { name: String },
    /// 前缀不是合法的整数
    #[error("无法将 AppID 转换为整数 ({name}, 前缀 \"{prefix}\"): {source}")]
    InvalidId {
        name: String,
        prefix: String,
        #[source]
        source: ParseIntError,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 无法读取监控目录
    #[error("无法读取目录 ({}): {source}", .path.display())]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 无法创建隔离目录
    #[error("无法创建隔离目录 ({}): {source}", .path.display())]
    QuarantineDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 隔离目录中已存在同名文件
    #[error("隔离目录中已存在同名文件: {}", .path.display())]
    QuarantineCollision { path: PathBuf },
    /// 移动文件到隔离目录失败
    #[error("无法移动 {} 到 {}: {source}", .from.display(), .to.display())]
    QuarantineMoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({}): {source}", .path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 无法打开日志文件
    #[error("无法打开日志文件 ({}): {source}", .path.display())]
    LogFileFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("无法读取配置文件 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 写入默认配置失败
    #[error("无法写入配置文件, 请检查 {} 的权限: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 刚刚生成了默认配置，需要用户先修改
    #[error("已生成默认配置文件 {}, 请修改后重新运行", .path.display())]
    DefaultCreated { path: PathBuf },
    /// 必填项为空
    #[error("配置项 {field} 不能为空")]
    MissingValue { field: &'static str },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建日志初始化错误
    pub fn logging(msg: impl Into<String>) -> Self {
        AppError::Logging(msg.into())
    }
}

impl NameError {
    /// 出错的文件名
    pub fn file_name(&self) -> &str {
        match self {
            NameError::MalformedName { name } | NameError::InvalidId { name, .. } => name,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
