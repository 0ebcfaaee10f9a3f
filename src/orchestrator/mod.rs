//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整批 URL 的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 管理资源（Browser、JsExecutor、SqliteStore）
//! - 加载 URL 列表
//! - 输出全局统计信息
//!
//! ### `ingestor` - URL 采集器
//! - 顺序遍历 URL，维护采集状态机
//! - 决定记录写入文档库还是缓存显示
//! - URL 之间固定间隔
//!
//! ## 层次关系
//!
//! ```text
//! app (持有资源)
//!     ↓
//! ingestor (处理 Vec<URL>)
//!     ↓
//! workflow::IngestFlow (处理单个 URL)
//!     ↓
//! services (能力层：dispatch / parse / classify / build / persist)
//! ```

pub mod app;
pub mod ingestor;

pub use app::App;
pub use ingestor::{IngestMode, IngestSummary, Ingestor};
