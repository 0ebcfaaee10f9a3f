/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::CanonicalRecord;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则本 crate 为 info（详细模式下为 debug）
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,math_problem_ingest={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, save: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 算术练习题采集");
    match config.browser_debug_port {
        Some(port) => info!("🌐 浏览器: 连接调试端口 {}", port),
        None => info!("🌐 浏览器: 本地启动 (无头: {})", config.headless),
    }
    info!("📄 每页题目数: {}", config.operations_per_page);
    if save {
        info!("💾 模式: 写入文档库 {}", config.db_path);
    } else {
        info!("👀 模式: 仅显示，不写入文档库");
    }
    info!("{}", "=".repeat(60));
}

/// 记录 URL 列表加载信息
pub fn log_sources_loaded(total: usize, sources_file: &str) {
    info!("✓ 从 {} 读取到 {} 个 URL", sources_file, total);
    info!("💡 逐个处理，每个 URL 之间有固定间隔\n");
}

/// 显示采集到的记录
pub fn log_records(records: &[CanonicalRecord]) {
    info!("\n{}", "=".repeat(60));
    info!("📋 采集到的题目 (共 {} 道)", records.len());
    info!("{}", "=".repeat(60));

    for (i, record) in records.iter().enumerate() {
        let meta = &record.metadata;
        info!("\n#{} {}", i + 1, record.id);
        info!("  题干: {}", truncate_text(&record.statement, 80));
        info!("  答案: {}", record.solution);
        info!(
            "  分类: {} / {}",
            record.taxonomy.area, record.taxonomy.subtopic
        );
        info!("  能力: {}", record.taxonomy.competency);
        info!(
            "  难度: {} (score {:.2})",
            meta.difficulty.level.label(),
            meta.difficulty.score
        );
        info!("  预计用时: {} 分钟", meta.estimated_minutes);
        info!("  运算类型: {}", meta.operation_kind.code());
        for step in &record.steps {
            info!("    {}. {}: {}", step.order, step.description, step.detail.text());
        }
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
