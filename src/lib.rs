//! # Scan Uploader
//!
//! 把监控目录中的扫描结果文件批量上传到 ThreadFix 的 Rust 应用程序
//!
//! 每次运行只处理一次目录快照，处理完即退出：
//! - 上传成功的文件在整个批次结束后删除
//! - 文件名无法解析、或被 ThreadFix 拒绝的文件移入 `parse-errors/`
//! - 网络失败的文件保留原处，下次运行时重试
//!
//! ## 架构设计
//!
//! ### ① 能力层（Clients / Services）
//! - `clients/` - `ScanUploader` 抽象与 `ThreadFixClient` 实现
//! - `services/` - `Quarantine` 隔离能力
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的完整处理流程
//! - `ScanCtx` - 上下文封装（文件序号 + 文件名）
//! - `ScanFlow` - 流程编排（parse → upload → classify → quarantine）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 读取快照、分批调度、延迟删除
//! - `orchestrator/pending` - 待删除集合
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ScanUploader, ThreadFixClient, UploadOutcome};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{parse_app_id, AppId};
pub use orchestrator::{App, BatchReport};
pub use workflow::{ProcessResult, ScanCtx, ScanFlow};
