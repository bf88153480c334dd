//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 读取监控目录快照
//! - 分批调度每个文件的 `ScanFlow`
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `pending` - 待删除集合
//! - 记录上传成功的文件
//! - 全部批次结束后统一删除
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ScanFile>)
//!     ↓
//! workflow::ScanFlow (处理单个文件)
//!     ↓
//! clients / services (能力层：upload / quarantine)
//! ```

pub mod batch_processor;
pub mod pending;

// 重新导出主要类型
pub use batch_processor::{App, BatchReport};
pub use pending::{DeletionReport, PendingDeletions};
