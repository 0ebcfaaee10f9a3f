use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::exercise::OperationKind;

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[serde(rename = "Básico")]
    Basic,
    #[serde(rename = "Intermedio")]
    Intermediate,
    #[serde(rename = "Avanzado")]
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Basic,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
    ];

    /// 存储层中的等级名称
    pub fn label(self) -> &'static str {
        match self {
            DifficultyLevel::Basic => "Básico",
            DifficultyLevel::Intermediate => "Intermedio",
            DifficultyLevel::Advanced => "Avanzado",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label)
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 难度分类结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyClassification {
    #[serde(rename = "nivel")]
    pub level: DifficultyLevel,
    pub score: f64,
}

/// 解题步骤的附加信息
///
/// 第一步记录操作数（`operacion`），第二步记录完整算式（`calculo`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDetail {
    #[serde(rename = "operacion")]
    Operands(String),
    #[serde(rename = "calculo")]
    Calculation(String),
}

impl StepDetail {
    pub fn text(&self) -> &str {
        match self {
            StepDetail::Operands(s) | StepDetail::Calculation(s) => s,
        }
    }
}

/// 解题步骤
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(rename = "orden")]
    pub order: u32,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(flatten)]
    pub detail: StepDetail,
}

/// 分类体系
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(rename = "area_curricular")]
    pub area: String,
    #[serde(rename = "subtema")]
    pub subtopic: String,
    #[serde(rename = "competencia")]
    pub competency: String,
    #[serde(rename = "grado_objetivo")]
    pub target_grades: BTreeSet<u32>,
}

/// 题目来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub url: String,
    #[serde(rename = "grupo")]
    pub group_id: String,
}

/// 题目元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(rename = "dificultad")]
    pub difficulty: DifficultyClassification,
    #[serde(rename = "tiempo_estimado")]
    pub estimated_minutes: u32,
    #[serde(rename = "conceptos_involucrados")]
    pub concepts: BTreeSet<String>,
    #[serde(rename = "tipo_operacion")]
    pub operation_kind: OperationKind,
    #[serde(rename = "fuente", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

/// 使用统计，只由外部消费者修改
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(rename = "veces_recomendado")]
    pub times_recommended: u64,
}

/// 规范化题目记录，持久化的基本单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "problema_id")]
    pub id: String,
    #[serde(rename = "enunciado")]
    pub statement: String,
    #[serde(rename = "solucion_completa")]
    pub solution: String,
    #[serde(rename = "pasos_detallados")]
    pub steps: Vec<Step>,
    #[serde(rename = "taxonomia")]
    pub taxonomy: Taxonomy,
    pub metadata: RecordMetadata,
    #[serde(rename = "estadisticas_uso")]
    pub usage_stats: UsageStats,
}
