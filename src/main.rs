use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use math_problem_ingest::services::report::{self, MetricsCollector};
use math_problem_ingest::utils::logging;
use math_problem_ingest::{App, Config, IngestMode, SqliteStore};

#[derive(Parser)]
#[command(name = "math_problem_ingest", version, about = "算术练习题采集与题库指标报告")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 采集 URL 列表中的练习页
    Ingest {
        /// 写入文档库（默认只显示）
        #[arg(long)]
        save: bool,
        /// 写入前不再确认
        #[arg(short, long)]
        yes: bool,
    },
    /// 统计文档库并输出指标报告
    Report {
        /// 同时保存 JSON 报告，省略路径时使用 REPORT_FILE
        #[arg(long, value_name = "PATH")]
        json: Option<Option<PathBuf>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Ingest { save, yes } => ingest(config, save, yes).await,
        Command::Report { json } => generate_report(config, json).await,
    }
}

async fn ingest(config: Config, save: bool, yes: bool) -> Result<()> {
    let mode = if save && (yes || confirm_save(&config.db_path).await?) {
        IngestMode::Persist
    } else {
        if save {
            warn!("⚠️ 未确认写入，改为仅显示");
        }
        IngestMode::Display
    };
    logging::log_startup(&config, mode == IngestMode::Persist);

    // 初始化并运行应用，结束后总是释放浏览器
    let app = App::initialize(config).await?;
    let result = app.run(mode).await;
    app.shutdown().await;

    result.map(|_| ())
}

async fn generate_report(config: Config, json: Option<Option<PathBuf>>) -> Result<()> {
    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("无法打开文档库: {}", config.db_path))?;

    let metrics = MetricsCollector::new(&store).collect()?;
    report::log_report(&metrics);

    if let Some(path) = json {
        let path = path.unwrap_or_else(|| PathBuf::from(&config.report_file));
        report::save_json(&metrics, path).await?;
    }
    Ok(())
}

/// 交互式确认是否写入文档库
async fn confirm_save(db_path: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("确认写入文档库 {}? (y/N): ", db_path).as_bytes())
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("读取确认输入失败")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí"))
}
