use once_cell::sync::Lazy;
use regex::Regex;

use super::{overflow, parse_index, ExerciseParser, FieldRole, RoleSlots};
use crate::error::ParseError;
use crate::models::OperationKind;

static DIVIDEND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^dividendo(\d+)").expect("valid dividend regex"));
static DIVISOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^divisor(\d+)").expect("valid divisor regex"));

/// 除法解析器：`dividendo{题号}` / `divisor{题号}`
///
/// 结果为向下取整的整数商；除数为 0 的题号直接跳过
#[derive(Debug, Clone, Copy, Default)]
pub struct DivisionParser;

impl ExerciseParser for DivisionParser {
    fn kind(&self) -> OperationKind {
        OperationKind::Division
    }

    fn match_field(&self, name: &str) -> Option<(u64, FieldRole)> {
        if let Some(caps) = DIVIDEND_RE.captures(name) {
            return Some((parse_index(&caps[1])?, FieldRole::First));
        }
        let caps = DIVISOR_RE.captures(name)?;
        Some((parse_index(&caps[1])?, FieldRole::Second))
    }

    fn compute(
        &self,
        index: u64,
        slots: &RoleSlots,
    ) -> Result<Option<(i64, i64, i64)>, ParseError> {
        let Some((dividend, divisor)) = slots.operands() else {
            return Ok(None);
        };
        if divisor == 0 {
            return Ok(None);
        }
        let quotient = floor_div(dividend, divisor).ok_or_else(|| overflow(self.kind(), index))?;
        Ok(Some((dividend, divisor, quotient)))
    }
}

/// 向下取整除法（向负无穷取整）
fn floor_div(dividend: i64, divisor: i64) -> Option<i64> {
    let quotient = dividend.checked_div(divisor)?;
    let remainder = dividend.checked_rem(divisor)?;
    if remainder != 0 && ((remainder < 0) != (divisor < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}
