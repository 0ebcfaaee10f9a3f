//! URL 采集器 - 编排层
//!
//! 顺序处理 URL 列表：每个 URL 走一遍 `IngestFlow`，再决定写入文档库还是缓存用于显示。
//! 单个 URL 的任何失败都不会中断整个批次。

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{DocumentStore, PageRenderer};
use crate::models::{CanonicalRecord, OperationKind};
use crate::services::ExercisePersistence;
use crate::workflow::{IngestFlow, IngestState, StateMachine, UrlCtx, UrlOutcome};

/// 记录的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// 写入文档库
    Persist,
    /// 只缓存，结束后显示
    Display,
}

/// 采集统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    /// URL 总数
    pub urls_total: usize,
    /// 无法识别而跳过的 URL
    pub urls_skipped: usize,
    /// 渲染或解析失败的 URL
    pub urls_failed: usize,
    /// 每种运算提取到的题目数
    pub extracted_by_kind: BTreeMap<OperationKind, usize>,
    /// 实际写入（新增 + 修改）的记录数
    pub persisted: usize,
    /// 显示模式下缓存的记录
    pub buffered: Vec<CanonicalRecord>,
}

impl IngestSummary {
    /// 提取到的题目总数
    pub fn extracted_total(&self) -> usize {
        self.extracted_by_kind.values().sum()
    }
}

/// URL 采集器
///
/// 借用渲染能力和存储能力，不负责它们的生命周期
pub struct Ingestor<'a, R: PageRenderer, S: DocumentStore> {
    renderer: &'a R,
    store: &'a S,
    flow: IngestFlow,
    mode: IngestMode,
    request_delay: Duration,
    state: StateMachine,
}

impl<'a, R: PageRenderer, S: DocumentStore> Ingestor<'a, R, S> {
    pub fn new(renderer: &'a R, store: &'a S, config: &Config, mode: IngestMode) -> Self {
        Self {
            renderer,
            store,
            flow: IngestFlow::new(config),
            mode,
            request_delay: config.request_delay(),
            state: StateMachine::new(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> IngestState {
        self.state.current()
    }

    /// 顺序处理所有 URL
    pub async fn run(&mut self, urls: &[String]) -> IngestSummary {
        let mut summary = IngestSummary {
            urls_total: urls.len(),
            ..Default::default()
        };

        for (idx, url) in urls.iter().enumerate() {
            let ctx = UrlCtx::new(idx + 1, urls.len(), url.as_str());
            log_url_start(&ctx);

            let outcome = self.flow.run(self.renderer, &ctx, &mut self.state).await;
            self.handle_outcome(&ctx, outcome, &mut summary);
            self.state.advance(IngestState::Idle);

            // 最后一个 URL 之后不再等待
            if !ctx.is_last() && !self.request_delay.is_zero() {
                sleep(self.request_delay).await;
            }
        }

        self.state.advance(IngestState::Done);
        summary
    }

    fn handle_outcome(&mut self, ctx: &UrlCtx, outcome: UrlOutcome, summary: &mut IngestSummary) {
        match outcome {
            UrlOutcome::Skipped => summary.urls_skipped += 1,
            UrlOutcome::Failed { kind, reason } => {
                warn!("{} ⚠️ {} 页面记为 0 道题: {}", ctx, kind, reason);
                summary.urls_failed += 1;
                summary.extracted_by_kind.entry(kind).or_default();
            }
            UrlOutcome::Extracted { kind, records } => {
                *summary.extracted_by_kind.entry(kind).or_default() += records.len();
                match self.mode {
                    IngestMode::Persist => {
                        self.state.advance(IngestState::Persisting);
                        let written =
                            ExercisePersistence::new(self.store).persist_batch(&records);
                        info!("{} 💾 写入 {}/{} 道题", ctx, written, records.len());
                        summary.persisted += written;
                    }
                    IngestMode::Display => summary.buffered.extend(records),
                }
            }
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_url_start(ctx: &UrlCtx) {
    info!("\n{}", "─".repeat(60));
    info!("{} 🌐 {}", ctx, ctx.url);
}
