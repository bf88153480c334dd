use std::path::PathBuf;
use std::time::SystemTime;

/// 监控目录中的一个条目
#[derive(Debug, Clone)]
pub struct ScanFile {
    /// 文件名（不含目录，仅用于排序和日志；非 UTF-8 字节显示为替换字符）
    pub name: String,
    /// 磁盘上的真实路径，后续所有文件操作都使用它
    pub path: PathBuf,
    /// 是否为普通文件（目录、符号链接等为 false）
    pub is_regular: bool,
    /// 以下两项仅用于日志
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// 一次性读取的目录快照，批处理期间不会重新读取
#[derive(Debug, Default)]
pub struct DirSnapshot {
    pub entries: Vec<ScanFile>,
}

impl DirSnapshot {
    /// 目录中没有任何条目
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 只保留普通文件
    pub fn regular_files(&self) -> impl Iterator<Item = &ScanFile> {
        self.entries.iter().filter(|f| f.is_regular)
    }
}
