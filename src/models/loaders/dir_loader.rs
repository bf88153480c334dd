use crate::error::FileError;
use crate::models::scan_file::{DirSnapshot, ScanFile};
use std::path::Path;
use tokio::fs;

/// 读取监控目录的一次快照（不递归）
///
/// 目录本身无法打开或读取时返回错误，这是批处理级别的致命错误。
/// 单个条目的元数据读取失败只记录警告，该条目按非普通文件处理。
pub async fn list_scan_files(dir: &Path) -> Result<DirSnapshot, FileError> {
    let read_failed = |source| FileError::DirectoryReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(read_failed)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let name = entry.file_name().to_string_lossy().to_string();

        // symlink_metadata：符号链接不算普通文件
        let (is_regular, size, modified) = match fs::symlink_metadata(entry.path()).await {
            Ok(meta) => (meta.file_type().is_file(), meta.len(), meta.modified().ok()),
            Err(e) => {
                tracing::warn!("无法读取 {} 的元数据: {}", entry.path().display(), e);
                (false, 0, None)
            }
        };

        files.push(ScanFile {
            name,
            path: entry.path(),
            is_regular,
            size,
            modified,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(DirSnapshot { entries: files })
}
