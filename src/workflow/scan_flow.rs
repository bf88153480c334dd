//! 文件处理流程 - 流程层
//!
//! 核心职责：定义"一个文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 解析文件名 → 失败则隔离（不上传）
//! 2. 上传 → 成功则等待批次结束后删除
//! 3. 内容被拒绝 / 响应无法解析 → 隔离
//! 4. 网络失败 → 保留原处，下次运行重试
//!
//! 每个文件最终只会落到三种结果之一，任何失败都不会中断整个批次。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::{ScanUploader, UploadOutcome};
use crate::error::{FileError, NameError};
use crate::models::{parse_app_id_from_path, AppId};
use crate::services::Quarantine;
use crate::workflow::scan_ctx::ScanCtx;

/// 文件处理结果
#[derive(Debug)]
pub enum ProcessResult {
    /// 上传成功，等待批次结束后删除
    Uploaded { app_id: AppId },
    /// 已移入隔离目录
    Quarantined {
        reason: QuarantineReason,
        dest: PathBuf,
    },
    /// 文件保留在监控目录中
    LeftInPlace { reason: LeftReason },
}

/// 隔离原因
#[derive(Debug)]
pub enum QuarantineReason {
    /// 文件名中无法得到 AppID
    UnroutableName(NameError),
    /// ThreadFix 拒绝了内容，或响应无法解析
    ContentRejected(UploadOutcome),
}

/// 保留原处的原因
#[derive(Debug)]
pub enum LeftReason {
    /// 网络 / HTTP 失败
    TransportFailure(String),
    /// 需要隔离，但移动失败
    QuarantineFailed {
        cause: QuarantineReason,
        error: FileError,
    },
    /// 处理任务异常退出，文件状态未知
    TaskFailed(String),
}

impl ProcessResult {
    pub fn is_quarantined(&self) -> bool {
        matches!(self, ProcessResult::Quarantined { .. })
    }
}

/// 文件处理流程
///
/// - 编排单个文件的 解析 → 上传 → 归类 → 隔离
/// - 不删除文件，删除由编排层在批次结束后统一执行
/// - 只依赖能力（uploader / quarantine）
#[derive(Clone)]
pub struct ScanFlow {
    uploader: Arc<dyn ScanUploader>,
    quarantine: Quarantine,
}

impl ScanFlow {
    pub fn new(watch_dir: impl AsRef<Path>, uploader: Arc<dyn ScanUploader>) -> Self {
        Self {
            uploader,
            quarantine: Quarantine::new(watch_dir),
        }
    }

    pub async fn run(&self, ctx: &ScanCtx) -> ProcessResult {
        // ========== 1. 解析 AppID ==========
        let app_id = match parse_app_id_from_path(&ctx.path) {
            Ok(id) => id,
            Err(e) => {
                error!("{} 无法从文件名获取 AppID: {}", ctx, e);
                if matches!(e, NameError::InvalidId { .. }) {
                    warn!("{} AppID 前缀不是整数，按问题文件隔离，继续处理其他文件", ctx);
                }
                return self
                    .quarantine_file(ctx, QuarantineReason::UnroutableName(e))
                    .await;
            }
        };

        // ========== 2. 上传 ==========
        info!("{} 📤 正在上传到 ThreadFix AppID {}", ctx, app_id);
        let outcome = self.uploader.upload(&ctx.path, app_id).await;

        // ========== 3. 归类 ==========
        match outcome {
            UploadOutcome::Success { message } => {
                info!("{} ✓ 成功上传到 ThreadFix AppID {} {}", ctx, app_id, message);
                ProcessResult::Uploaded { app_id }
            }
            UploadOutcome::TransportFailure { message } => {
                error!("{} ❌ 上传失败，文件保留原处: {}", ctx, message);
                ProcessResult::LeftInPlace {
                    reason: LeftReason::TransportFailure(message),
                }
            }
            rejected @ (UploadOutcome::ContentRejected { .. }
            | UploadOutcome::MalformedResponse { .. }) => {
                error!("{} ❌ {}", ctx, rejected);
                self.quarantine_file(ctx, QuarantineReason::ContentRejected(rejected))
                    .await
            }
        }
    }

    /// 隔离文件（尽力而为，失败则保留原处）
    async fn quarantine_file(&self, ctx: &ScanCtx, reason: QuarantineReason) -> ProcessResult {
        match self.quarantine.move_file(&ctx.path).await {
            Ok(dest) => ProcessResult::Quarantined { reason, dest },
            Err(error) => {
                error!("{} ⚠️ 无法隔离文件，保留原处: {}", ctx, error);
                ProcessResult::LeftInPlace {
                    reason: LeftReason::QuarantineFailed {
                        cause: reason,
                        error,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// 固定返回同一结果的上传器
    struct FixedUploader {
        outcome: UploadOutcome,
        calls: AtomicUsize,
    }

    impl FixedUploader {
        fn new(outcome: UploadOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ScanUploader for FixedUploader {
        async fn upload(&self, _path: &Path, _app_id: AppId) -> UploadOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn setup(name: &str) -> (TempDir, ScanCtx) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(name), "<scan/>").unwrap();
        let ctx = ScanCtx::new(1, 1, dir.path().join(name));
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_success_keeps_file_until_batch_end() {
        let (dir, ctx) = setup("5_[App].xml");
        let uploader = FixedUploader::new(UploadOutcome::success("ok"));
        let flow = ScanFlow::new(dir.path(), uploader.clone());

        let result = flow.run(&ctx).await;

        assert!(matches!(result, ProcessResult::Uploaded { app_id: AppId(5) }));
        assert!(dir.path().join("5_[App].xml").exists(), "删除应在批次结束后进行");
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_name_is_quarantined_without_upload() {
        let (dir, ctx) = setup("bad.xml");
        let uploader = FixedUploader::new(UploadOutcome::success("ok"));
        let flow = ScanFlow::new(dir.path(), uploader.clone());

        let result = flow.run(&ctx).await;

        match result {
            ProcessResult::Quarantined {
                reason: QuarantineReason::UnroutableName(NameError::MalformedName { .. }),
                dest,
            } => assert_eq!(dest, dir.path().join("parse-errors").join("bad.xml")),
            other => panic!("期望隔离，实际: {:?}", other),
        }
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
        assert!(!dir.path().join("bad.xml").exists());
    }

    #[tokio::test]
    async fn test_invalid_id_is_quarantined_not_fatal() {
        let (dir, ctx) = setup("abc_[Foo].xml");
        let flow = ScanFlow::new(dir.path(), FixedUploader::new(UploadOutcome::success("")));

        let result = flow.run(&ctx).await;

        assert!(matches!(
            result,
            ProcessResult::Quarantined {
                reason: QuarantineReason::UnroutableName(NameError::InvalidId { .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rejected_and_malformed_responses_are_quarantined() {
        for outcome in [
            UploadOutcome::rejected("Invalid scan"),
            UploadOutcome::malformed("expected value at line 1"),
        ] {
            let (dir, ctx) = setup("7_[App2].xml");
            let flow = ScanFlow::new(dir.path(), FixedUploader::new(outcome));

            let result = flow.run(&ctx).await;

            assert!(result.is_quarantined(), "实际: {:?}", result);
            assert!(dir.path().join("parse-errors").join("7_[App2].xml").exists());
        }
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_file_untouched() {
        let (dir, ctx) = setup("9_[App3].xml");
        let flow = ScanFlow::new(
            dir.path(),
            FixedUploader::new(UploadOutcome::transport("operation timed out")),
        );

        let result = flow.run(&ctx).await;

        assert!(matches!(
            result,
            ProcessResult::LeftInPlace {
                reason: LeftReason::TransportFailure(_)
            }
        ));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("9_[App3].xml")).unwrap(),
            "<scan/>"
        );
        assert!(!dir.path().join("parse-errors").exists());
    }

    #[tokio::test]
    async fn test_quarantine_failure_leaves_file_in_place() {
        let (dir, ctx) = setup("bad.xml");
        std::fs::create_dir(dir.path().join("parse-errors")).unwrap();
        std::fs::write(dir.path().join("parse-errors").join("bad.xml"), "old").unwrap();
        let flow = ScanFlow::new(dir.path(), FixedUploader::new(UploadOutcome::success("")));

        let result = flow.run(&ctx).await;

        assert!(matches!(
            result,
            ProcessResult::LeftInPlace {
                reason: LeftReason::QuarantineFailed {
                    error: FileError::QuarantineCollision { .. },
                    ..
                }
            }
        ));
        assert!(dir.path().join("bad.xml").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_name_is_quarantined_without_upload() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"9_[Ap\xffp].xml"));
        std::fs::write(&path, "<scan/>").unwrap();
        let uploader = FixedUploader::new(UploadOutcome::success("ok"));
        let flow = ScanFlow::new(dir.path(), uploader.clone());

        let result = flow.run(&ScanCtx::new(1, 1, path.clone())).await;

        assert!(matches!(
            result,
            ProcessResult::Quarantined {
                reason: QuarantineReason::UnroutableName(NameError::MalformedName { .. }),
                ..
            }
        ));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
        assert!(dir
            .path()
            .join("parse-errors")
            .join(path.file_name().unwrap())
            .exists());
    }
}
