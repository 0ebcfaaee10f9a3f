use once_cell::sync::Lazy;
use regex::Regex;

use super::{overflow, parse_index, ExerciseParser, FieldRole, RoleSlots};
use crate::error::ParseError;
use crate::models::OperationKind;

static FACTOR_A_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^factora(\d+)").expect("valid factor regex"));
static FACTOR_B_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^factorb(\d+)").expect("valid factor regex"));
static PRODUCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^resultad[oa](\d+)").expect("valid product regex"));

/// 乘法解析器：`factora{题号}` / `factorb{题号}` / `resultado{题号}`
///
/// 页面给出结果字段时以页面为准，否则自行计算
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplicationParser;

impl ExerciseParser for MultiplicationParser {
    fn kind(&self) -> OperationKind {
        OperationKind::Multiplication
    }

    fn match_field(&self, name: &str) -> Option<(u64, FieldRole)> {
        let patterns: [(&Regex, FieldRole); 3] = [
            (&*FACTOR_A_RE, FieldRole::First),
            (&*FACTOR_B_RE, FieldRole::Second),
            (&*PRODUCT_RE, FieldRole::Result),
        ];
        patterns.into_iter().find_map(|(re, role)| {
            let caps = re.captures(name)?;
            Some((parse_index(&caps[1])?, role))
        })
    }

    fn compute(
        &self,
        index: u64,
        slots: &RoleSlots,
    ) -> Result<Option<(i64, i64, i64)>, ParseError> {
        let Some((a, b)) = slots.operands() else {
            return Ok(None);
        };
        let product = match slots.result {
            Some(from_page) => from_page,
            None => a.checked_mul(b).ok_or_else(|| overflow(self.kind(), index))?,
        };
        Ok(Some((a, b, product)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ctx, fields};
    use super::*;

    #[test]
    fn test_computes_product_without_page_result() {
        let input = fields(&[("factora1", "6"), ("factorb1", "7")]);
        let tuples = MultiplicationParser.parse(&input, &ctx()).unwrap();
        assert_eq!(tuples[0].result, 42);
    }

    #[test]
    fn test_page_result_is_authoritative() {
        let input = fields(&[
            ("factora1", "6"),
            ("factorb1", "7"),
            ("resultado1", "41"),
            ("factora2", "3"),
            ("factorb2", "3"),
            ("resultada2", "9"),
        ]);
        let tuples = MultiplicationParser.parse(&input, &ctx()).unwrap();

        assert_eq!(tuples.len(), 2);
        assert_eq!(tuples[0].result, 41);
        assert_eq!(tuples[1].result, 9);
    }

    #[test]
    fn test_result_alone_does_not_emit() {
        let input = fields(&[("resultado1", "12"), ("factora1", "3")]);
        assert!(MultiplicationParser.parse(&input, &ctx()).unwrap().is_empty());
    }
}
