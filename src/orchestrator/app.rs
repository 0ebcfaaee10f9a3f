//! 应用生命周期 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：打开文档库、建立浏览器会话、创建 JsExecutor
//! 2. **加载 URL**：从 TOML 文件读取待抓取的练习页
//! 3. **顺序采集**：委托 `Ingestor` 逐个处理 URL
//! 4. **资源释放**：无论成功与否都关闭浏览器
//! 5. **全局统计**：输出按运算类型的汇总

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{DocumentStore, Filter, JsExecutor, SqliteStore};
use crate::models::load_source_urls;
use crate::orchestrator::ingestor::{IngestMode, IngestSummary, Ingestor};
use crate::utils::logging;

/// 应用主结构
///
/// 唯一持有 Browser 和文档库连接的模块
pub struct App {
    config: Config,
    browser: Browser,
    handler: JoinHandle<()>,
    launched: bool,
    executor: JsExecutor,
    store: SqliteStore,
}

impl App {
    /// 初始化应用
    ///
    /// 文档库或浏览器任一无法建立都视为致命错误
    pub async fn initialize(config: Config) -> Result<Self> {
        let store = SqliteStore::open(&config.db_path)
            .with_context(|| format!("无法打开文档库: {}", config.db_path))?;

        let session = browser::open_session(&config)
            .await
            .context("无法建立浏览器会话")?;

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(session.page);

        Ok(Self {
            config,
            browser: session.browser,
            handler: session.handler,
            launched: session.launched,
            executor,
            store,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, mode: IngestMode) -> Result<IngestSummary> {
        let urls = self.load_urls().await?;

        if urls.is_empty() {
            warn!("⚠️ URL 列表为空，程序结束");
            return Ok(IngestSummary::default());
        }
        logging::log_sources_loaded(urls.len(), &self.config.sources_file);

        let mut ingestor = Ingestor::new(&self.executor, &self.store, &self.config, mode);
        let summary = ingestor.run(&urls).await;

        if mode == IngestMode::Display {
            logging::log_records(&summary.buffered);
        }
        print_final_stats(&summary, mode, self.total_stored());

        Ok(summary)
    }

    /// 释放浏览器资源
    pub async fn shutdown(mut self) {
        if self.launched {
            if let Err(e) = self.browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("⚠️ 等待浏览器退出失败: {}", e);
            }
        } else if let Err(e) = self.executor.page().clone().close().await {
            // 连接的是外部浏览器，只关闭自己创建的页面
            warn!("⚠️ 关闭页面失败: {}", e);
        }
        self.handler.abort();
        debug!("浏览器资源已释放");
    }

    async fn load_urls(&self) -> Result<Vec<String>> {
        info!("\n📁 正在读取 URL 列表: {}", self.config.sources_file);
        load_source_urls(&self.config.sources_file).await
    }

    fn total_stored(&self) -> Option<usize> {
        self.store.count(&Filter::all()).ok()
    }
}

// ========== 日志辅助函数 ==========

fn print_final_stats(summary: &IngestSummary, mode: IngestMode, total_stored: Option<usize>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for (kind, count) in &summary.extracted_by_kind {
        info!("  {:<16} {:>6} 道", kind.subtopic(), count);
    }
    info!("  {:<16} {:>6} 道", "合计", summary.extracted_total());
    info!("{}", "─".repeat(60));
    info!("🌐 URL: 共 {} 个", summary.urls_total);
    info!("⏭️ 跳过: {}", summary.urls_skipped);
    info!("❌ 失败: {}", summary.urls_failed);
    if mode == IngestMode::Persist {
        info!("💾 写入: {}", summary.persisted);
        if let Some(total) = total_stored {
            info!("📚 文档库共 {} 道题", total);
        }
    }
    info!("{}", "=".repeat(60));
}
