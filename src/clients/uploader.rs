//! 上传能力的抽象
//!
//! 流程层只依赖 `ScanUploader`，测试时可以替换成假的实现

use crate::models::AppId;
use async_trait::async_trait;
use std::fmt::{self, Display};
use std::path::Path;

/// 一次上传的结果
///
/// 所有失败都以变体返回，调用方不需要也不应该检查错误信息的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 上传成功
    Success { message: String },
    /// 网络 / HTTP 层面的失败，文件保留原处，下次运行会重试
    TransportFailure { message: String },
    /// 服务端解析了请求，但拒绝了扫描内容
    ContentRejected { message: String },
    /// 服务端返回的内容无法解析为响应对象
    MalformedResponse { message: String },
}

impl UploadOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        UploadOutcome::Success {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        UploadOutcome::TransportFailure {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        UploadOutcome::ContentRejected {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        UploadOutcome::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }
}

impl Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Success { message } => write!(f, "上传成功: {}", message),
            UploadOutcome::TransportFailure { message } => {
                write!(f, "上传过程中发生错误: {}", message)
            }
            UploadOutcome::ContentRejected { message } => {
                write!(f, "ThreadFix 拒绝了上传内容: {}", message)
            }
            UploadOutcome::MalformedResponse { message } => {
                write!(f, "无法解析 ThreadFix 响应: {}", message)
            }
        }
    }
}

/// 扫描文件上传器
#[async_trait]
pub trait ScanUploader: Send + Sync {
    /// 上传 `path` 指向的文件到 `app_id` 对应的应用
    ///
    /// 不做重试
    async fn upload(&self, path: &Path, app_id: AppId) -> UploadOutcome;
}
