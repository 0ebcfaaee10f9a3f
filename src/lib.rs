//! # Math Problem Ingest
//!
//! 从算术练习网站采集题目，规范化为带难度分类的记录并写入文档库
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page、数据库连接），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，实现 `PageRenderer`
//! - `SqliteStore` - JSON 文档存储，实现 `DocumentStore`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面或单道题
//! - `UrlDispatcher` - URL → 解析器
//! - `parsers` - 隐藏字段 → 原始题目（加减乘除各一个）
//! - `classifier` / `record_builder` - 难度分类与规范化记录
//! - `ExercisePersistence` - 按记录 ID upsert
//! - `MetricsCollector` - 题库指标报告
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个 URL"的完整处理流程
//! - `UrlCtx` - 上下文封装（URL 序号）
//! - `IngestFlow` - 流程编排（dispatch → render → parse → structure）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 管理资源和生命周期
//! - `orchestrator/ingestor` - 顺序处理 URL 列表，维护状态机
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{BrowserError, ConfigError, ParseError, StoreError};
pub use infrastructure::{DocumentStore, JsExecutor, PageRenderer, SqliteStore};
pub use models::{CanonicalRecord, OperationKind, RawExerciseTuple, RawField};
pub use orchestrator::{App, IngestMode, IngestSummary, Ingestor};
pub use workflow::{IngestFlow, UrlCtx, UrlOutcome};
