use serde::{Deserialize, Serialize};

/// 运算类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    /// 加法
    #[serde(rename = "suma")]
    Addition,
    /// 减法
    #[serde(rename = "resta")]
    Subtraction,
    /// 乘法
    #[serde(rename = "multiplicacion")]
    Multiplication,
    /// 除法
    #[serde(rename = "division")]
    Division,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Addition,
        OperationKind::Subtraction,
        OperationKind::Multiplication,
        OperationKind::Division,
    ];

    /// 存储层使用的标识（与 serde 序列化结果一致）
    pub fn code(self) -> &'static str {
        match self {
            OperationKind::Addition => "suma",
            OperationKind::Subtraction => "resta",
            OperationKind::Multiplication => "multiplicacion",
            OperationKind::Division => "division",
        }
    }

    /// 题面中使用的运算符号
    pub fn symbol(self) -> &'static str {
        match self {
            OperationKind::Addition => "+",
            OperationKind::Subtraction => "-",
            OperationKind::Multiplication => "×",
            OperationKind::Division => "÷",
        }
    }

    /// 分类体系中的子主题名称
    pub fn subtopic(self) -> &'static str {
        match self {
            OperationKind::Addition => "Adición",
            OperationKind::Subtraction => "Sustracción",
            OperationKind::Multiplication => "Multiplicación",
            OperationKind::Division => "División",
        }
    }

    /// 预计完成时间（分钟）
    pub fn estimated_minutes(self) -> u32 {
        match self {
            OperationKind::Addition | OperationKind::Subtraction => 1,
            OperationKind::Multiplication | OperationKind::Division => 2,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 页面隐藏字段 (name, value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    pub value: String,
}

impl RawField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 来源上下文：URL 以及从 URL 中提取的层级和分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub url: String,
    pub level_tier: u32,
    pub group_id: String,
}

/// 解析器输出的原始题目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExerciseTuple {
    pub kind: OperationKind,
    pub operand_a: i64,
    pub operand_b: i64,
    pub result: i64,
    pub source_url: String,
    pub level_tier: u32,
    pub group_id: String,
}

impl RawExerciseTuple {
    pub fn new(
        kind: OperationKind,
        operand_a: i64,
        operand_b: i64,
        result: i64,
        ctx: &SourceContext,
    ) -> Self {
        Self {
            kind,
            operand_a,
            operand_b,
            result,
            source_url: ctx.url.clone(),
            level_tier: ctx.level_tier,
            group_id: ctx.group_id.clone(),
        }
    }

    /// 原始运算式，例如 `3 + 4 = 7`
    pub fn operation(&self) -> String {
        format!(
            "{} {} {} = {}",
            self.operand_a,
            self.kind.symbol(),
            self.operand_b,
            self.result
        )
    }
}
