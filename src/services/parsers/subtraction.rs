use once_cell::sync::Lazy;
use regex::Regex;

use super::{overflow, parse_index, ExerciseParser, FieldRole, RoleSlots};
use crate::error::ParseError;
use crate::models::OperationKind;

static MINUEND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^minuendo(\d+)").expect("valid minuend regex"));
static SUBTRAHEND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sustraendo(\d+)").expect("valid subtrahend regex"));

/// 减法解析器：`minuendo{题号}` / `sustraendo{题号}`
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtractionParser;

impl ExerciseParser for SubtractionParser {
    fn kind(&self) -> OperationKind {
        OperationKind::Subtraction
    }

    fn match_field(&self, name: &str) -> Option<(u64, FieldRole)> {
        if let Some(caps) = MINUEND_RE.captures(name) {
            return Some((parse_index(&caps[1])?, FieldRole::First));
        }
        let caps = SUBTRAHEND_RE.captures(name)?;
        Some((parse_index(&caps[1])?, FieldRole::Second))
    }

    fn compute(
        &self,
        index: u64,
        slots: &RoleSlots,
    ) -> Result<Option<(i64, i64, i64)>, ParseError> {
        let Some((minuend, subtrahend)) = slots.operands() else {
            return Ok(None);
        };
        let difference = minuend
            .checked_sub(subtrahend)
            .ok_or_else(|| overflow(self.kind(), index))?;
        Ok(Some((minuend, subtrahend, difference)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ctx, fields};
    use super::*;

    #[test]
    fn test_subtraction_pairs_by_index() {
        let input = fields(&[
            ("minuendo2", "40"),
            ("sustraendo1", "3"),
            ("minuendo1", "10"),
            ("sustraendo2", "15"),
        ]);
        let tuples = SubtractionParser.parse(&input, &ctx()).unwrap();

        let results: Vec<(i64, i64, i64)> = tuples
            .iter()
            .map(|t| (t.operand_a, t.operand_b, t.result))
            .collect();
        assert_eq!(results, vec![(10, 3, 7), (40, 15, 25)]);
    }

    #[test]
    fn test_negative_difference_is_kept() {
        let input = fields(&[("minuendo1", "2"), ("sustraendo1", "5")]);
        let tuples = SubtractionParser.parse(&input, &ctx()).unwrap();
        assert_eq!(tuples[0].result, -3);
    }

    #[test]
    fn test_missing_subtrahend_is_dropped() {
        let input = fields(&[("minuendo1", "2"), ("minuendo2", "8"), ("sustraendo2", "1")]);
        let tuples = SubtractionParser.parse(&input, &ctx()).unwrap();

        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].operand_a, 8);
    }
}
