//! 隔离服务 - 业务能力层
//!
//! 只负责"把问题文件挪进 parse-errors"能力，不关心流程

use crate::error::FileError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// 隔离目录名，位于监控目录下一层
pub const QUARANTINE_DIR_NAME: &str = "parse-errors";

/// 隔离服务
///
/// 职责：
/// - 首次需要时创建 parse-errors 目录（仅所有者可访问）
/// - 把单个文件重命名进该目录，保留文件名
/// - 失败时原文件保持不动
#[derive(Debug, Clone)]
pub struct Quarantine {
    dir: PathBuf,
}

impl Quarantine {
    pub fn new(watch_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: watch_dir.as_ref().join(QUARANTINE_DIR_NAME),
        }
    }

    /// 隔离目录路径
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 确保隔离目录存在，已存在不算错误
    pub async fn ensure_dir(&self) -> Result<(), FileError> {
        if is_dir(&self.dir).await {
            return Ok(());
        }

        info!("正在创建 {} 用于存放问题文件", self.dir.display());

        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o700);

        match builder.create(&self.dir).await {
            Ok(()) => Ok(()),
            // 并发任务可能同时创建；同名的普通文件仍然是错误
            Err(source) if source.kind() == ErrorKind::AlreadyExists => {
                if is_dir(&self.dir).await {
                    Ok(())
                } else {
                    Err(FileError::QuarantineDirFailed {
                        path: self.dir.clone(),
                        source,
                    })
                }
            }
            Err(source) => Err(FileError::QuarantineDirFailed {
                path: self.dir.clone(),
                source,
            }),
        }
    }

    /// 把 `from` 指向的文件移入隔离目录，保留原文件名
    ///
    /// # 返回
    /// 返回文件的新路径
    pub async fn move_file(&self, from: &Path) -> Result<PathBuf, FileError> {
        let Some(file_name) = from.file_name() else {
            return Err(FileError::QuarantineMoveFailed {
                from: from.to_path_buf(),
                to: self.dir.clone(),
                source: std::io::Error::new(ErrorKind::InvalidInput, "路径中没有文件名"),
            });
        };

        self.ensure_dir().await?;

        let to = self.dir.join(file_name);
        check_destination(from, to.clone(), fs::try_exists(&to).await)?;

        fs::rename(from, &to)
            .await
            .map_err(|source| FileError::QuarantineMoveFailed {
                from: from.to_path_buf(),
                to: to.clone(),
                source,
            })?;

        info!("问题文件已移动到 {}", to.display());
        Ok(to)
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// rename 在 unix 上会静默覆盖，目标已存在或无法确认时都不移动
fn check_destination(
    from: &Path,
    to: PathBuf,
    exists: std::io::Result<bool>,
) -> Result<(), FileError> {
    match exists {
        Ok(false) => Ok(()),
        Ok(true) => Err(FileError::QuarantineCollision { path: to }),
        Err(source) => Err(FileError::QuarantineMoveFailed {
            from: from.to_path_buf(),
            to,
            source,
        }),
    }
}
