use once_cell::sync::Lazy;
use regex::Regex;

use super::{overflow, parse_index, ExerciseParser, FieldRole, RoleSlots};
use crate::error::ParseError;
use crate::models::OperationKind;

/// `sumando{题号}{槽位}`：最后一位数字是加数槽位（1 或 2），前面的数字是题号
static ADDEND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sumando(\d+)(\d)").expect("valid addend regex"));

/// 加法解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct AdditionParser;

impl ExerciseParser for AdditionParser {
    fn kind(&self) -> OperationKind {
        OperationKind::Addition
    }

    fn match_field(&self, name: &str) -> Option<(u64, FieldRole)> {
        let caps = ADDEND_RE.captures(name)?;
        let index = parse_index(&caps[1])?;
        let role = match &caps[2] {
            "1" => FieldRole::First,
            "2" => FieldRole::Second,
            _ => FieldRole::Ignored,
        };
        Some((index, role))
    }

    fn compute(
        &self,
        index: u64,
        slots: &RoleSlots,
    ) -> Result<Option<(i64, i64, i64)>, ParseError> {
        let Some((a, b)) = slots.operands() else {
            return Ok(None);
        };
        let sum = a.checked_add(b).ok_or_else(|| overflow(self.kind(), index))?;
        Ok(Some((a, b, sum)))
    }
}
