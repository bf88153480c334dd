//! 文件处理上下文
//!
//! 封装"我正在处理本批第几个文件"这一信息

use std::fmt::Display;
use std::path::PathBuf;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct ScanCtx {
    /// 文件序号（从1开始，仅用于日志显示）
    pub file_index: usize,

    /// 本次运行的普通文件总数
    pub total_files: usize,

    /// 文件名（仅用于日志）
    pub file_name: String,

    /// 文件在磁盘上的真实路径
    pub path: PathBuf,
}

impl ScanCtx {
    pub fn new(file_index: usize, total_files: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_index,
            total_files,
            file_name,
            path,
        }
    }
}

impl Display for ScanCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文件 {}/{} {}]",
            self.file_index, self.total_files, self.file_name
        )
    }
}
