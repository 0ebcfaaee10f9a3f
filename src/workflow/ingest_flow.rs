//! URL 采集流程 - 流程层
//!
//! 核心职责：定义"一个 URL"的完整处理流程
//!
//! 流程顺序：
//! 1. 分发：按 URL 标记选择解析器（未命中则跳过）
//! 2. 渲染：打开页面并读取隐藏字段
//! 3. 解析：字段 → 原始题目
//! 4. 结构化：分类难度并构建规范化记录
//!
//! 持久化由编排层负责

use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::PageRenderer;
use crate::models::{CanonicalRecord, OperationKind, RawExerciseTuple};
use crate::services::{classifier, record_builder, PageReader, UrlDispatcher};
use crate::workflow::ingest_state::{IngestState, StateMachine};
use crate::workflow::url_ctx::UrlCtx;

/// 单个 URL 的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum UrlOutcome {
    /// 没有解析器认领该 URL
    Skipped,
    /// 渲染或解析失败，本 URL 产出 0 道题
    Failed { kind: OperationKind, reason: String },
    /// 成功产出记录（可能为空）
    Extracted {
        kind: OperationKind,
        records: Vec<CanonicalRecord>,
    },
}

/// URL 采集流程
///
/// - 不持有任何资源（page / 数据库连接）
/// - 只依赖业务能力（services）
pub struct IngestFlow {
    dispatcher: UrlDispatcher,
    page_reader: PageReader,
    verbose_logging: bool,
}

impl IngestFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            dispatcher: UrlDispatcher::new(),
            page_reader: PageReader::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    pub async fn run<R: PageRenderer>(
        &self,
        renderer: &R,
        ctx: &UrlCtx,
        state: &mut StateMachine,
    ) -> UrlOutcome {
        // ========== 1. 分发 ==========
        let Some(parser) = self.dispatcher.dispatch(&ctx.url) else {
            warn!("{} ⚠️ 无法识别的 URL，跳过: {}", ctx, ctx.url);
            return UrlOutcome::Skipped;
        };
        let kind = parser.kind();
        let source = self.dispatcher.source_context(&ctx.url);
        info!(
            "{} 🔍 运算类型: {} (层级 {}, 分组 {})",
            ctx, kind, source.level_tier, source.group_id
        );

        // ========== 2. 渲染 ==========
        state.advance(IngestState::Rendering);
        let fields = match self.page_reader.read(renderer, &ctx.url).await {
            Ok(fields) => fields,
            Err(e) => {
                error!("{} ❌ 页面渲染失败: {:#}", ctx, e);
                return UrlOutcome::Failed {
                    kind,
                    reason: format!("{:#}", e),
                };
            }
        };

        // ========== 3. 解析 ==========
        state.advance(IngestState::Parsing);
        let tuples = match parser.parse(&fields, &source) {
            Ok(tuples) => tuples,
            Err(e) => {
                error!("{} ❌ 字段解析失败: {}", ctx, e);
                return UrlOutcome::Failed {
                    kind,
                    reason: e.to_string(),
                };
            }
        };
        info!("{} ✓ 提取到 {} 道{}题", ctx, tuples.len(), kind.subtopic());

        if self.verbose_logging {
            self.log_tuples(ctx, &tuples);
        }

        // ========== 4. 结构化 ==========
        state.advance(IngestState::Structuring);
        let records = tuples
            .iter()
            .map(|tuple| {
                let difficulty = classifier::classify(tuple.kind, tuple.operand_a, tuple.operand_b);
                record_builder::build(tuple, difficulty)
            })
            .collect();

        UrlOutcome::Extracted { kind, records }
    }

    // ========== 日志辅助方法 ==========

    fn log_tuples(&self, ctx: &UrlCtx, tuples: &[RawExerciseTuple]) {
        for tuple in tuples {
            info!("{}   {}", ctx, tuple.operation());
        }
    }
}
