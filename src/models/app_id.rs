//! 从文件名中提取 ThreadFix AppID
//!
//! 文件名约定：`{AppID}{分隔符}[{App Name}]...`，
//! 例如 `12_[Foo].Foo-28.4.2015-16.20.41.xml` → AppID 12

use crate::error::NameError;
use std::fmt::{self, Display};
use std::path::Path;

/// AppID 与名称之间的分隔标记
const DELIMITER: char = '[';

/// ThreadFix 应用 ID（上传路由用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId(pub u64);

impl Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 解析文件名中的 AppID
///
/// 找到第一个 `[`，丢弃它前面紧挨着的一个分隔字符，其余前缀按十进制整数解析。
/// `[` 不存在或位于下标 0/1 时返回 `MalformedName`；前缀不是整数时返回 `InvalidId`。
pub fn parse_app_id(file_name: &str) -> Result<AppId, NameError> {
    let malformed = || NameError::MalformedName {
        name: file_name.to_string(),
    };

    let bracket = match file_name.find(DELIMITER) {
        Some(i) if i >= 2 => i,
        _ => return Err(malformed()),
    };

    // 分隔符可能是多字节字符，按字符边界截断
    let separator_start = file_name[..bracket]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .ok_or_else(malformed)?;

    let prefix = &file_name[..separator_start];
    if prefix.is_empty() {
        return Err(malformed());
    }

    prefix
        .parse::<u64>()
        .map(AppId)
        .map_err(|source| NameError::InvalidId {
            name: file_name.to_string(),
            prefix: prefix.to_string(),
            source,
        })
}

/// 从路径的文件名部分解析 AppID
///
/// 非 UTF-8 的文件名无法按约定解析，视为 `MalformedName`
pub fn parse_app_id_from_path(path: &Path) -> Result<AppId, NameError> {
    let file_name = path.file_name().unwrap_or_default();
    match file_name.to_str() {
        Some(name) => parse_app_id(name),
        None => Err(NameError::MalformedName {
            name: file_name.to_string_lossy().into_owned(),
        }),
    }
}
