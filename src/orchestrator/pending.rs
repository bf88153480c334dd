//! 待删除集合
//!
//! 上传成功的文件先记录在这里，整个批次结束后统一删除

use crate::error::FileError;
use crate::models::AppId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// 待删除的文件：磁盘路径 → AppID
#[derive(Debug, Default)]
pub struct PendingDeletions {
    files: BTreeMap<PathBuf, AppId>,
}

/// 删除结果
#[derive(Debug, Default)]
pub struct DeletionReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, FileError)>,
}

impl PendingDeletions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个上传成功的文件
    ///
    /// # 返回
    /// 同一路径已存在时返回 false
    pub fn insert(&mut self, path: impl Into<PathBuf>, app_id: AppId) -> bool {
        use std::collections::btree_map::Entry;

        match self.files.entry(path.into()) {
            Entry::Vacant(slot) => {
                slot.insert(app_id);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// 删除所有记录的文件，消耗集合
    ///
    /// 单个文件删除失败只记录错误，不影响其他文件，也不重试
    pub async fn delete_all(self) -> DeletionReport {
        let mut report = DeletionReport::default();

        for (path, app_id) in self.files {
            info!(
                "🗑️ 删除文件 {} (已上传到 ThreadFix AppID {})",
                path.display(),
                app_id
            );

            match tokio::fs::remove_file(&path).await {
                Ok(()) => report.deleted.push(path),
                Err(source) => {
                    let err = FileError::DeleteFailed {
                        path: path.clone(),
                        source,
                    };
                    error!("删除文件出错: {}", err);
                    report.failed.push((path, err));
                }
            }
        }

        report
    }
}
