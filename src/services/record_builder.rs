//! 规范化记录构建 - 业务能力层
//!
//! 原始题目 + 难度分类 → 持久化用的嵌套记录

use std::collections::BTreeSet;

use chrono::Utc;

use crate::models::{
    CanonicalRecord, DifficultyClassification, RawExerciseTuple, RecordMetadata, SourceRef, Step,
    StepDetail, Taxonomy, UsageStats,
};

const CURRICULAR_AREA: &str = "Números y operaciones";
const COMPETENCY: &str = "Resuelve problemas de cantidad";

/// 构建规范化记录
///
/// 记录 ID 为 `P_{运算}_{a}_{b}_{毫秒时间戳}`，同一次运行内可区分，
/// 但不同运行之间同一道题会得到不同的 ID
pub fn build(tuple: &RawExerciseTuple, difficulty: DifficultyClassification) -> CanonicalRecord {
    build_at(tuple, difficulty, Utc::now().timestamp_millis())
}

/// 使用指定的时间戳（毫秒）构建记录
pub fn build_at(
    tuple: &RawExerciseTuple,
    difficulty: DifficultyClassification,
    ingested_at_millis: i64,
) -> CanonicalRecord {
    let kind = tuple.kind;
    let subtopic = kind.subtopic();

    CanonicalRecord {
        id: format!(
            "P_{}_{}_{}_{}",
            kind.code().to_uppercase(),
            tuple.operand_a,
            tuple.operand_b,
            ingested_at_millis
        ),
        statement: format!(
            "Calcula: {} {} {}",
            tuple.operand_a,
            kind.symbol(),
            tuple.operand_b
        ),
        solution: tuple.result.to_string(),
        steps: vec![
            Step {
                order: 1,
                description: format!("Identificar {}", subtopic.to_lowercase()),
                detail: StepDetail::Operands(format!("{}, {}", tuple.operand_a, tuple.operand_b)),
            },
            Step {
                order: 2,
                description: "Realizar operación".to_string(),
                detail: StepDetail::Calculation(tuple.operation()),
            },
        ],
        taxonomy: Taxonomy {
            area: CURRICULAR_AREA.to_string(),
            subtopic: subtopic.to_string(),
            competency: COMPETENCY.to_string(),
            target_grades: BTreeSet::from([tuple.level_tier]),
        },
        metadata: RecordMetadata {
            difficulty,
            estimated_minutes: kind.estimated_minutes(),
            concepts: BTreeSet::from([subtopic.to_string()]),
            operation_kind: kind,
            source: Some(SourceRef {
                url: tuple.source_url.clone(),
                group_id: tuple.group_id.clone(),
            }),
        },
        usage_stats: UsageStats::default(),
    }
}
