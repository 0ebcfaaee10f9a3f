//! 指标报告 - 业务能力层
//!
//! 只读地统计文档库中的题目：类型分布、字段完整度、重复、难度分布、分数统计、
//! 查询延迟，可选输出 JSON 文件

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::infrastructure::{DocumentStore, Filter};
use crate::models::DifficultyLevel;

const KIND_PATH: &str = "$.metadata.tipo_operacion";
const LEVEL_PATH: &str = "$.metadata.dificultad.nivel";
const STATEMENT_PATH: &str = "$.enunciado";
const ID_PATH: &str = "$.problema_id";
const SUBTOPIC_PATH: &str = "$.taxonomia.subtema";

const NO_KIND: &str = "Sin tipo";

/// 每种查询的计时次数
pub const LATENCY_ITERATIONS: usize = 100;
/// p99 延迟目标（毫秒）
const LATENCY_TARGET_MS: f64 = 100.0;

/// 数量与占比
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountShare {
    #[serde(rename = "cantidad")]
    pub count: usize,
    #[serde(rename = "porcentaje")]
    pub percentage: f64,
}

/// 按运算类型的分布
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindDistribution {
    #[serde(rename = "datos")]
    pub rows: BTreeMap<String, CountShare>,
    pub total: usize,
}

/// 字段完整度（百分比）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completeness {
    #[serde(rename = "enunciado")]
    pub statement: f64,
    #[serde(rename = "solucion")]
    pub solution: f64,
    #[serde(rename = "conceptos")]
    pub concepts: f64,
}

/// 重复分析，按 (运算类型, 题干) 分组
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateSummary {
    #[serde(rename = "total_problemas")]
    pub total: usize,
    #[serde(rename = "grupos_duplicados")]
    pub groups: usize,
    #[serde(rename = "problemas_duplicados")]
    pub duplicated: usize,
    #[serde(rename = "porcentaje_duplicados")]
    pub percentage: f64,
    #[serde(rename = "problemas_unicos")]
    pub unique: usize,
}

/// 各难度等级的数量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    #[serde(rename = "Básico")]
    pub basic: usize,
    #[serde(rename = "Intermedio")]
    pub intermediate: usize,
    #[serde(rename = "Avanzado")]
    pub advanced: usize,
    /// 缺失或无法识别的等级
    #[serde(rename = "Sin nivel", skip_serializing_if = "is_zero")]
    pub unknown: usize,
    #[serde(rename = "Total")]
    pub total: usize,
}

impl LevelCounts {
    fn add(&mut self, level: Option<DifficultyLevel>, count: usize) {
        match level {
            Some(DifficultyLevel::Basic) => self.basic += count,
            Some(DifficultyLevel::Intermediate) => self.intermediate += count,
            Some(DifficultyLevel::Advanced) => self.advanced += count,
            None => self.unknown += count,
        }
        self.total += count;
    }

    fn merge(&mut self, other: &LevelCounts) {
        self.basic += other.basic;
        self.intermediate += other.intermediate;
        self.advanced += other.advanced;
        self.unknown += other.unknown;
        self.total += other.total;
    }
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

/// 难度分布
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyTable {
    #[serde(rename = "por_tipo")]
    pub by_kind: BTreeMap<String, LevelCounts>,
    #[serde(rename = "totales")]
    pub totals: LevelCounts,
}

/// 分数统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreStats {
    #[serde(rename = "media")]
    pub mean: f64,
    #[serde(rename = "mediana")]
    pub median: f64,
    #[serde(rename = "desviacion")]
    pub std_dev: f64,
    #[serde(rename = "minimo")]
    pub min: f64,
    #[serde(rename = "maximo")]
    pub max: f64,
}

/// 难度占比（百分比）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyShare {
    #[serde(rename = "basico_pct")]
    pub basic: f64,
    #[serde(rename = "intermedio_pct")]
    pub intermediate: f64,
    #[serde(rename = "avanzado_pct")]
    pub advanced: f64,
}

/// 单种查询的延迟（毫秒）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLatency {
    #[serde(rename = "media_ms")]
    pub mean_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

/// 查询名称 → 延迟
pub type LatencyTable = BTreeMap<String, QueryLatency>;

/// 执行摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    #[serde(rename = "total_problemas")]
    pub total: usize,
    #[serde(rename = "tipos_operacion")]
    pub kinds: usize,
    #[serde(rename = "distribucion_dificultad")]
    pub difficulty: DifficultyShare,
    /// 各查询平均延迟的均值
    #[serde(rename = "latencia_promedio_ms")]
    pub mean_latency_ms: f64,
    /// 所有查询的 p99 都低于目标
    #[serde(rename = "cumple_objetivo_latencia")]
    pub meets_latency_target: bool,
}

/// 完整报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    #[serde(rename = "distribucion_por_tipo")]
    pub distribution: KindDistribution,
    #[serde(rename = "completitud")]
    pub completeness: BTreeMap<String, Completeness>,
    #[serde(rename = "duplicados")]
    pub duplicates: DuplicateSummary,
    #[serde(rename = "distribucion_dificultad")]
    pub difficulty: DifficultyTable,
    #[serde(rename = "estadisticas_scores")]
    pub scores: BTreeMap<String, ScoreStats>,
    #[serde(rename = "latencias")]
    pub latencies: LatencyTable,
    #[serde(rename = "resumen_ejecutivo")]
    pub summary: ExecutiveSummary,
    pub timestamp: String,
}

/// 指标收集器
pub struct MetricsCollector<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> MetricsCollector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 生成完整报告
    pub fn collect(&self) -> StoreResult<MetricsReport> {
        let distribution = self.distribution_by_kind()?;
        let difficulty = self.difficulty_distribution()?;
        let latencies = self.query_latencies(LATENCY_ITERATIONS)?;
        let summary = executive_summary(&distribution, &difficulty, &latencies);

        Ok(MetricsReport {
            completeness: self.field_completeness()?,
            duplicates: self.duplicate_analysis()?,
            scores: self.score_statistics()?,
            distribution,
            difficulty,
            latencies,
            summary,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// 按运算类型的分布
    pub fn distribution_by_kind(&self) -> StoreResult<KindDistribution> {
        let rows = self.store.aggregate(&[KIND_PATH])?;
        let total: usize = rows.iter().map(|r| r.count).sum();

        let mut distribution = BTreeMap::new();
        for row in rows {
            let label = kind_label(row.keys[0].as_deref());
            let entry = distribution.entry(label).or_insert(CountShare {
                count: 0,
                percentage: 0.0,
            });
            entry.count += row.count;
            entry.percentage = round_to(percent(entry.count, total), 1);
        }

        Ok(KindDistribution {
            rows: distribution,
            total,
        })
    }

    /// 各类型中题干、答案、知识点字段的完整度
    pub fn field_completeness(&self) -> StoreResult<BTreeMap<String, Completeness>> {
        let documents = self.store.find(&Filter::all(), None)?;
        if documents.is_empty() {
            warn!("⚠️ 文档库中没有题目");
            return Ok(BTreeMap::new());
        }

        // (总数, 有题干, 有答案, 有知识点)
        let mut tallies: BTreeMap<String, (usize, usize, usize, usize)> = BTreeMap::new();
        for doc in &documents {
            let tally = tallies.entry(document_kind_label(doc)).or_default();
            tally.0 += 1;
            if has_text(doc.get("enunciado")) {
                tally.1 += 1;
            }
            if has_text(doc.get("solucion_completa")) {
                tally.2 += 1;
            }
            if doc["metadata"]["conceptos_involucrados"].is_array() {
                tally.3 += 1;
            }
        }

        Ok(tallies
            .into_iter()
            .map(|(label, (total, statement, solution, concepts))| {
                (
                    label,
                    Completeness {
                        statement: round_to(percent(statement, total), 1),
                        solution: round_to(percent(solution, total), 1),
                        concepts: round_to(percent(concepts, total), 1),
                    },
                )
            })
            .collect())
    }

    /// 重复分析
    pub fn duplicate_analysis(&self) -> StoreResult<DuplicateSummary> {
        let rows = self.store.aggregate(&[KIND_PATH, STATEMENT_PATH])?;
        let total: usize = rows.iter().map(|r| r.count).sum();
        let duplicate_groups: Vec<_> = rows.iter().filter(|r| r.count > 1).collect();
        let duplicated: usize = duplicate_groups.iter().map(|r| r.count - 1).sum();

        Ok(DuplicateSummary {
            total,
            groups: duplicate_groups.len(),
            duplicated,
            percentage: round_to(percent(duplicated, total), 2),
            unique: total - duplicated,
        })
    }

    /// 按类型和难度等级的分布
    pub fn difficulty_distribution(&self) -> StoreResult<DifficultyTable> {
        let rows = self.store.aggregate(&[KIND_PATH, LEVEL_PATH])?;

        let mut by_kind: BTreeMap<String, LevelCounts> = BTreeMap::new();
        for row in rows {
            let level = row.keys[1].as_deref().and_then(DifficultyLevel::from_label);
            by_kind
                .entry(kind_label(row.keys[0].as_deref()))
                .or_default()
                .add(level, row.count);
        }

        let mut totals = LevelCounts::default();
        for counts in by_kind.values() {
            totals.merge(counts);
        }

        Ok(DifficultyTable { by_kind, totals })
    }

    /// 各类型的分数统计
    pub fn score_statistics(&self) -> StoreResult<BTreeMap<String, ScoreStats>> {
        let documents = self.store.find(&Filter::all(), None)?;

        let mut scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for doc in &documents {
            let values = scores.entry(document_kind_label(doc)).or_default();
            if let Some(score) = doc["metadata"]["dificultad"]["score"].as_f64() {
                values.push(score);
            }
        }

        Ok(scores
            .into_iter()
            .filter_map(|(label, values)| score_stats(values).map(|stats| (label, stats)))
            .collect())
    }

    /// 四种典型查询各执行 `iterations` 次，统计延迟
    pub fn query_latencies(&self, iterations: usize) -> StoreResult<LatencyTable> {
        info!("⏱️ 执行 {} 次测试查询...", iterations);

        let by_id = Filter::all().exists(ID_PATH);
        let by_kind = Filter::all().eq(KIND_PATH, "suma");
        let by_level = Filter::all().eq(LEVEL_PATH, DifficultyLevel::Basic.label());

        let mut table = LatencyTable::new();
        table.insert(
            "Por problema_id".to_string(),
            time_query(iterations, || self.store.find(&by_id, Some(1)).map(|_| ()))?,
        );
        table.insert(
            "Por tipo operación".to_string(),
            time_query(iterations, || self.store.find(&by_kind, Some(10)).map(|_| ()))?,
        );
        table.insert(
            "Por dificultad".to_string(),
            time_query(iterations, || self.store.find(&by_level, Some(10)).map(|_| ()))?,
        );
        table.insert(
            "Agregación taxonomía".to_string(),
            time_query(iterations, || self.store.aggregate(&[SUBTOPIC_PATH]).map(|_| ()))?,
        );
        Ok(table)
    }
}

/// 执行摘要
fn executive_summary(
    distribution: &KindDistribution,
    difficulty: &DifficultyTable,
    latencies: &LatencyTable,
) -> ExecutiveSummary {
    let mean_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.values().map(|l| l.mean_ms).sum::<f64>() / latencies.len() as f64
    };
    ExecutiveSummary {
        total: distribution.total,
        kinds: distribution.rows.len(),
        difficulty: level_shares(&difficulty.totals),
        mean_latency_ms: round_to(mean_latency_ms, 2),
        meets_latency_target: latencies.values().all(|l| l.p99_ms < LATENCY_TARGET_MS),
    }
}

/// 各难度等级占该行总数的百分比
fn level_shares(counts: &LevelCounts) -> DifficultyShare {
    DifficultyShare {
        basic: round_to(percent(counts.basic, counts.total), 1),
        intermediate: round_to(percent(counts.intermediate, counts.total), 1),
        advanced: round_to(percent(counts.advanced, counts.total), 1),
    }
}

fn time_query(
    iterations: usize,
    mut query: impl FnMut() -> StoreResult<()>,
) -> StoreResult<QueryLatency> {
    let mut samples = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let start = Instant::now();
        query()?;
        samples.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    Ok(latency_stats(samples))
}

/// 毫秒样本的均值、p95、p99；空样本全为 0
pub fn latency_stats(mut samples: Vec<f64>) -> QueryLatency {
    if samples.is_empty() {
        return QueryLatency {
            mean_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
        };
    }
    samples.sort_by(|a, b| a.total_cmp(b));
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    QueryLatency {
        mean_ms: round_to(mean, 2),
        p95_ms: round_to(percentile(&samples, 0.95), 2),
        p99_ms: round_to(percentile(&samples, 0.99), 2),
    }
}

fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    let idx = (fraction * sorted.len() as f64) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// 均值、中位数、样本标准差、最小值、最大值；空集合返回 None
pub fn score_stats(mut values: Vec<f64>) -> Option<ScoreStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    };
    let std_dev = if n > 1 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    Some(ScoreStats {
        mean: round_to(mean, 2),
        median: round_to(median, 2),
        std_dev: round_to(std_dev, 2),
        min: round_to(values[0], 2),
        max: round_to(values[n - 1], 2),
    })
}

/// 保存报告为 JSON 文件
pub async fn save_json(report: &MetricsReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(report).context("序列化报告失败")?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("写入报告失败: {}", path.display()))?;
    info!("✅ 报告已保存至: {}", path.display());
    Ok(())
}

/// 运算类型的显示名：首字母大写，缺失时为 "Sin tipo"
fn kind_label(code: Option<&str>) -> String {
    match code.filter(|c| !c.is_empty()) {
        Some(code) => {
            let mut chars = code.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => NO_KIND.to_string(),
            }
        }
        None => NO_KIND.to_string(),
    }
}

fn document_kind_label(doc: &JsonValue) -> String {
    kind_label(doc["metadata"]["tipo_operacion"].as_str())
}

fn has_text(value: Option<&JsonValue>) -> bool {
    matches!(value, Some(JsonValue::String(s)) if !s.is_empty())
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ========== 日志辅助函数 ==========

/// 在日志中输出报告的各个表格
pub fn log_report(report: &MetricsReport) {
    info!("{}", "=".repeat(70));
    info!("📊 题库指标报告");
    info!("{}", "=".repeat(70));

    info!("\n📋 按运算类型分布");
    info!("{:<20} {:>10} {:>12}", "类型", "数量", "占比");
    info!("{}", "-".repeat(45));
    for (label, share) in &report.distribution.rows {
        info!("{:<20} {:>10} {:>11.1}%", label, share.count, share.percentage);
    }
    info!("{}", "-".repeat(45));
    info!("{:<20} {:>10} {:>12}", "TOTAL", report.distribution.total, "100.0%");

    info!("\n📋 字段完整度");
    info!("{:<15} {:>12} {:>12} {:>12}", "类型", "题干", "答案", "知识点");
    for (label, c) in &report.completeness {
        info!(
            "{:<15} {:>11.0}% {:>11.0}% {:>11.0}%",
            label, c.statement, c.solution, c.concepts
        );
    }

    let dup = &report.duplicates;
    info!("\n📋 重复检测");
    info!("题目总数: {}", dup.total);
    info!("重复分组: {}", dup.groups);
    info!("重复题目: {} ({:.2}%)", dup.duplicated, dup.percentage);
    info!("唯一题目: {}", dup.unique);

    info!("\n📋 难度分布");
    info!(
        "{:<15} {:>10} {:>10} {:>10} {:>10}",
        "类型", "Básico", "Interm.", "Avanz.", "Total"
    );
    for (label, counts) in &report.difficulty.by_kind {
        log_level_row(label, counts);
    }
    info!("{}", "-".repeat(58));
    let totals = &report.difficulty.totals;
    log_level_row("TOTAL", totals);
    if totals.total > 0 {
        let share = level_shares(totals);
        info!(
            "{:<15} {:>9.1}% {:>9.1}% {:>9.1}% {:>10}",
            "Porcentaje", share.basic, share.intermediate, share.advanced, "100.0%"
        );
    }

    info!("\n📋 难度分数统计");
    info!(
        "{:<15} {:>8} {:>8} {:>8} {:>12}",
        "类型", "均值", "中位数", "标准差", "范围"
    );
    for (label, s) in &report.scores {
        info!(
            "{:<15} {:>8.2} {:>8.2} {:>8.2} [{:.1}-{:.1}]",
            label, s.mean, s.median, s.std_dev, s.min, s.max
        );
    }

    info!("\n📋 查询延迟");
    info!("{:<25} {:>10} {:>10} {:>10}", "查询", "均值", "P95", "P99");
    info!("{}", "-".repeat(58));
    for (name, l) in &report.latencies {
        info!(
            "{:<25} {:>8.2}ms {:>8.2}ms {:>8.2}ms",
            name, l.mean_ms, l.p95_ms, l.p99_ms
        );
    }

    let summary = &report.summary;
    info!("\n📌 题目总数: {}", summary.total);
    info!("📌 运算类型: {}", summary.kinds);
    info!("📌 难度分布:");
    info!("   - Básico: {}%", summary.difficulty.basic);
    info!("   - Intermedio: {}%", summary.difficulty.intermediate);
    info!("   - Avanzado: {}%", summary.difficulty.advanced);
    info!("📌 平均查询延迟: {:.2}ms", summary.mean_latency_ms);
    if summary.meets_latency_target {
        info!("✅ 所有查询 P99 < {}ms", LATENCY_TARGET_MS);
    } else {
        warn!("⚠️ 部分查询 P99 超过 {}ms", LATENCY_TARGET_MS);
    }
    info!("{}", "=".repeat(70));
}

fn log_level_row(label: &str, counts: &LevelCounts) {
    info!(
        "{:<15} {:>10} {:>10} {:>10} {:>10}",
        label, counts.basic, counts.intermediate, counts.advanced, counts.total
    );
}
