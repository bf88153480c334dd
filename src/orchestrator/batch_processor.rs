//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次目录快照的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **读取快照**：一次性列出监控目录，之后不再重新读取
//! 2. **分批处理**：按 `max_concurrent_uploads` 分批，每批完成后再开始下一批
//! 3. **并发控制**：使用 Semaphore 限制同时上传的数量（默认 1，即顺序处理）
//! 4. **延迟删除**：上传成功的文件记入待删除集合，全部批次结束后统一删除
//! 5. **全局统计**：汇总所有文件的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文件的细节，委托 `ScanFlow`
//! - **单一汇总点**：任务结果通过 JoinHandle 返回，只有本模块写待删除集合

use crate::clients::{ScanUploader, ThreadFixClient};
use crate::config::Config;
use crate::models::{list_scan_files, ScanFile};
use crate::orchestrator::pending::PendingDeletions;
use crate::workflow::{LeftReason, ProcessResult, ScanCtx, ScanFlow};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, trace, warn};

/// 应用主结构
pub struct App {
    config: Config,
    watch_dir: PathBuf,
    flow: ScanFlow,
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// 目录中的条目总数（含子目录）
    pub total_entries: usize,
    /// 普通文件数量
    pub regular_files: usize,
    pub uploaded: usize,
    pub quarantined: usize,
    pub left_in_place: usize,
    pub deleted: usize,
    pub delete_failed: usize,
}

impl App {
    /// 初始化应用，使用 ThreadFix 客户端上传
    pub fn initialize(config: Config) -> Result<Self> {
        let client = ThreadFixClient::new(&config)?;
        Ok(Self::with_uploader(config, Arc::new(client)))
    }

    /// 使用指定的上传器初始化应用
    pub fn with_uploader(config: Config, uploader: Arc<dyn ScanUploader>) -> Self {
        let watch_dir = config.watch_dir();
        let flow = ScanFlow::new(watch_dir.clone(), uploader);
        Self {
            config,
            watch_dir,
            flow,
        }
    }

    /// 运行一次批处理
    ///
    /// 只有监控目录无法读取时返回错误；单个文件的失败只记录日志
    pub async fn run(&self) -> Result<BatchReport> {
        info!("📁 正在读取上传目录 {}", self.watch_dir.display());

        let snapshot = list_scan_files(&self.watch_dir)
            .await
            .with_context(|| format!("无法读取上传目录 {}", self.watch_dir.display()))?;

        let mut report = BatchReport {
            total_entries: snapshot.len(),
            ..Default::default()
        };

        if snapshot.is_empty() {
            warn!("⚠️ {} 中没有待处理的文件", self.watch_dir.display());
            info!("目录为空，提前结束");
            return Ok(report);
        }

        let files: Vec<ScanFile> = snapshot.regular_files().cloned().collect();
        report.regular_files = files.len();
        log_files_loaded(&report, self.config.concurrency());

        // 处理所有文件
        let pending = self.process_all_files(&files, &mut report).await?;

        // 全部批次结束后才删除
        if !pending.is_empty() {
            info!("🗑️ 全部批次已结束，开始删除 {} 个已上传文件", pending.len());
        }
        let deletion = pending.delete_all().await;
        report.deleted = deletion.deleted.len();
        report.delete_failed = deletion.failed.len();

        print_final_stats(&report);

        Ok(report)
    }

    /// 分批处理所有文件，返回待删除集合
    async fn process_all_files(
        &self,
        files: &[ScanFile],
        report: &mut BatchReport,
    ) -> Result<PendingDeletions> {
        let batch_size = self.config.concurrency();
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_files = files.len();
        let total_batches = (total_files + batch_size - 1) / batch_size;
        let mut pending = PendingDeletions::new();

        for batch_start in (0..total_files).step_by(batch_size) {
            let batch_end = (batch_start + batch_size).min(total_files);
            let batch_num = (batch_start / batch_size) + 1;

            if total_batches > 1 {
                log_batch_start(
                    batch_num,
                    total_batches,
                    batch_start + 1,
                    batch_end,
                    total_files,
                );
            }

            let batch = &files[batch_start..batch_end];
            let results = self
                .process_batch(batch, batch_start, total_files, semaphore.clone())
                .await?;

            let mut batch_uploaded = 0;
            for (path, result) in results {
                match result {
                    ProcessResult::Uploaded { app_id } => {
                        if pending.insert(path, app_id) {
                            batch_uploaded += 1;
                        }
                    }
                    ProcessResult::Quarantined { .. } => report.quarantined += 1,
                    ProcessResult::LeftInPlace { .. } => report.left_in_place += 1,
                }
            }
            report.uploaded += batch_uploaded;

            if total_batches > 1 {
                log_batch_complete(batch_num, batch_uploaded, batch_end - batch_start);
            }
        }

        Ok(pending)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch: &[ScanFile],
        batch_start: usize,
        total_files: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<Vec<(PathBuf, ProcessResult)>> {
        let mut paths = Vec::with_capacity(batch.len());
        let mut handles = Vec::with_capacity(batch.len());

        // 为本批创建任务，每个文件的完整流程在一个任务内完成
        for (idx, file) in batch.iter().enumerate() {
            let ctx = ScanCtx::new(batch_start + idx + 1, total_files, file.path.clone());
            log_file_details(&ctx, file);
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                flow.run(&ctx).await
            }));
            paths.push(file.path.clone());
        }

        // 等待本批所有任务完成
        let results: Vec<_> = paths
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(path, joined)| match joined {
                Ok(result) => (path, result),
                Err(e) => {
                    error!("[{}] 任务执行失败，文件保留原处: {}", path.display(), e);
                    let reason = LeftReason::TaskFailed(e.to_string());
                    (path, ProcessResult::LeftInPlace { reason })
                }
            })
            .collect();

        Ok(results)
    }
}

// ========== 日志辅助函数 ==========

fn log_files_loaded(report: &BatchReport, max_concurrent: usize) {
    info!(
        "✓ 找到 {} 个条目，其中 {} 个普通文件",
        report.total_entries, report.regular_files
    );
    if max_concurrent > 1 {
        info!("📋 将以每批 {} 个的方式处理", max_concurrent);
    }
}

fn log_file_details(ctx: &ScanCtx, file: &ScanFile) {
    match file.modified {
        Some(modified) => trace!(
            "{} 大小 {} 字节，修改时间 {}",
            ctx,
            file.size,
            chrono::DateTime::<chrono::Local>::from(modified).format("%Y-%m-%d %H:%M:%S")
        ),
        None => trace!("{} 大小 {} 字节", ctx, file.size),
    }
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批文件: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, uploaded: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 上传成功 {}/{}", batch_num, uploaded, total);
    info!("{}", "─".repeat(60));
}

fn print_final_stats(report: &BatchReport) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 上传成功: {}/{}", report.uploaded, report.regular_files);
    info!("🗑️ 已删除: {}", report.deleted);
    info!("🚧 已隔离: {}", report.quarantined);
    info!("⏸️ 保留原处: {}", report.left_in_place);
    if report.delete_failed > 0 {
        warn!("❌ 删除失败: {}", report.delete_failed);
    }
    info!("{}", "=".repeat(60));
}
