//! 字段模式解析器 - 业务能力层
//!
//! 每种运算一个解析器。页面把每道题拆成若干隐藏字段，字段名里嵌着题号和角色
//! （第一个操作数 / 第二个操作数 / 页面给出的结果），解析器负责：
//!
//! 1. 识别属于本运算的字段名，提取题号和角色
//! 2. 按题号分组
//! 3. 两个操作数齐全的题号才生成题目，缺角色的题号直接丢弃
//! 4. 计算结果（或采用页面给出的结果）
//! 5. 按题号升序输出

mod addition;
mod division;
mod multiplication;
mod subtraction;

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::models::{OperationKind, RawExerciseTuple, RawField, SourceContext};

pub use addition::AdditionParser;
pub use division::DivisionParser;
pub use multiplication::MultiplicationParser;
pub use subtraction::SubtractionParser;

/// 字段在一道题中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    First,
    Second,
    Result,
    /// 命中本运算的命名规则，但不参与计算
    Ignored,
}

/// 同一题号下收集到的字段值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSlots {
    pub first: Option<i64>,
    pub second: Option<i64>,
    pub result: Option<i64>,
}

impl RoleSlots {
    fn set(&mut self, role: FieldRole, value: i64) {
        match role {
            FieldRole::First => self.first = Some(value),
            FieldRole::Second => self.second = Some(value),
            FieldRole::Result => self.result = Some(value),
            FieldRole::Ignored => {}
        }
    }

    /// 两个操作数都存在时返回
    pub fn operands(&self) -> Option<(i64, i64)> {
        Some((self.first?, self.second?))
    }
}

/// 解析器接口
pub trait ExerciseParser: Send + Sync {
    /// 本解析器处理的运算类型
    fn kind(&self) -> OperationKind;

    /// 识别字段名，返回 (题号, 角色)；不属于本运算的字段返回 None
    fn match_field(&self, name: &str) -> Option<(u64, FieldRole)>;

    /// 由一个题号下的字段计算 (a, b, 结果)；返回 None 表示丢弃该题号
    fn compute(
        &self,
        index: u64,
        slots: &RoleSlots,
    ) -> Result<Option<(i64, i64, i64)>, ParseError>;

    /// 解析整页字段
    fn parse(
        &self,
        fields: &[RawField],
        ctx: &SourceContext,
    ) -> Result<Vec<RawExerciseTuple>, ParseError> {
        let groups = group_by_index(self, fields)?;
        let mut tuples = Vec::with_capacity(groups.len());

        for (index, slots) in &groups {
            if let Some((a, b, result)) = self.compute(*index, slots)? {
                tuples.push(RawExerciseTuple::new(self.kind(), a, b, result, ctx));
            }
        }

        Ok(tuples)
    }
}

/// 按题号分组（BTreeMap 保证题号升序）
pub fn group_by_index<P: ExerciseParser + ?Sized>(
    parser: &P,
    fields: &[RawField],
) -> Result<BTreeMap<u64, RoleSlots>, ParseError> {
    let mut groups: BTreeMap<u64, RoleSlots> = BTreeMap::new();

    for field in fields {
        if field.name.is_empty() || field.value.is_empty() {
            continue;
        }
        let Some((index, role)) = parser.match_field(&field.name) else {
            continue;
        };
        let value = parse_value(field)?;
        groups.entry(index).or_default().set(role, value);
    }

    Ok(groups)
}

/// 字段值转整数，失败视为格式错误
fn parse_value(field: &RawField) -> Result<i64, ParseError> {
    field
        .value
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseError::malformed(&field.name, &field.value))
}

/// 解析题号数字，超出范围的视为不匹配
fn parse_index(digits: &str) -> Option<u64> {
    digits.parse().ok()
}

fn overflow(kind: OperationKind, index: u64) -> ParseError {
    ParseError::Overflow {
        kind: kind.code().to_string(),
        index,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{RawField, SourceContext};

    pub fn fields(pairs: &[(&str, &str)]) -> Vec<RawField> {
        pairs.iter().map(|(n, v)| RawField::new(*n, *v)).collect()
    }

    pub fn ctx() -> SourceContext {
        SourceContext {
            url: "https://matesdeprimaria.es/test.php?g=G7&n=2".to_string(),
            level_tier: 2,
            group_id: "G7".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{ctx, fields};
    use super::*;

    #[test]
    fn test_malformed_value_aborts_parse() {
        let parser = SubtractionParser;
        let input = fields(&[("minuendo1", "9"), ("sustraendo1", "tres")]);

        let err = parser.parse(&input, &ctx()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedValue { ref field, .. } if field == "sustraendo1"
        ));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let parser = SubtractionParser;
        let input = fields(&[("minuendo1", ""), ("sustraendo1", "3"), ("", "5")]);

        assert!(parser.parse(&input, &ctx()).unwrap().is_empty());
    }

    #[test]
    fn test_tuples_carry_source_context() {
        let parser = MultiplicationParser;
        let input = fields(&[("factora1", "2"), ("factorb1", "3")]);

        let tuples = parser.parse(&input, &ctx()).unwrap();
        assert_eq!(tuples[0].source_url, ctx().url);
        assert_eq!(tuples[0].level_tier, 2);
        assert_eq!(tuples[0].group_id, "G7");
    }
}
