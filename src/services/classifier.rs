//! 难度分类 - 纯函数
//!
//! 根据运算类型和操作数大小估算解题步数，再由步数换算分数和等级：
//! `score = steps * 0.3 + 0.5`，保留两位小数

use crate::models::{DifficultyClassification, DifficultyLevel, OperationKind};

/// 与复杂度无关的固定分数
const BASE_SCORE: f64 = 0.5;
/// 每一步的分数权重
const STEP_WEIGHT: f64 = 0.3;

/// 估算解题步数
pub fn step_count(kind: OperationKind, operand_a: i64, operand_b: i64) -> u32 {
    match kind {
        OperationKind::Addition => {
            if operand_a <= 10 && operand_b <= 10 {
                1
            } else {
                2
            }
        }
        OperationKind::Subtraction => {
            if operand_a <= 20 {
                1
            } else {
                2
            }
        }
        OperationKind::Multiplication => {
            if operand_a <= 5 && operand_b <= 5 {
                1
            } else {
                3
            }
        }
        OperationKind::Division => {
            if operand_a <= 50 {
                2
            } else {
                3
            }
        }
    }
}

/// 分数对应的等级
pub fn level_for(score: f64) -> DifficultyLevel {
    if score < 1.0 {
        DifficultyLevel::Basic
    } else if score < 2.0 {
        DifficultyLevel::Intermediate
    } else {
        DifficultyLevel::Advanced
    }
}

/// 计算题目难度
pub fn classify(kind: OperationKind, operand_a: i64, operand_b: i64) -> DifficultyClassification {
    let steps = step_count(kind, operand_a, operand_b);
    let score = round2(f64::from(steps) * STEP_WEIGHT + BASE_SCORE);
    DifficultyClassification {
        level: level_for(score),
        score,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_large_dividend_is_intermediate() {
        let result = classify(OperationKind::Division, 100, 25);
        assert_eq!(step_count(OperationKind::Division, 100, 25), 3);
        assert_eq!(result.score, 1.4);
        assert_eq!(result.level, DifficultyLevel::Intermediate);
    }

    #[test]
    fn test_small_addition_is_basic() {
        let result = classify(OperationKind::Addition, 5, 5);
        assert_eq!(step_count(OperationKind::Addition, 5, 5), 1);
        assert_eq!(result.score, 0.8);
        assert_eq!(result.level, DifficultyLevel::Basic);
    }

    #[test]
    fn test_step_thresholds_per_kind() {
        assert_eq!(step_count(OperationKind::Addition, 10, 10), 1);
        assert_eq!(step_count(OperationKind::Addition, 3, 11), 2);

        // 减法只看被减数
        assert_eq!(step_count(OperationKind::Subtraction, 20, 99), 1);
        assert_eq!(step_count(OperationKind::Subtraction, 21, 1), 2);

        assert_eq!(step_count(OperationKind::Multiplication, 5, 5), 1);
        assert_eq!(step_count(OperationKind::Multiplication, 6, 1), 3);

        assert_eq!(step_count(OperationKind::Division, 50, 5), 2);
        assert_eq!(step_count(OperationKind::Division, 51, 3), 3);
    }

    #[test]
    fn test_scores_and_levels() {
        assert_eq!(classify(OperationKind::Subtraction, 30, 4).score, 1.1);
        assert_eq!(
            classify(OperationKind::Subtraction, 30, 4).level,
            DifficultyLevel::Intermediate
        );
        assert_eq!(classify(OperationKind::Division, 10, 2).score, 1.1);

        assert_eq!(level_for(0.99), DifficultyLevel::Basic);
        assert_eq!(level_for(1.0), DifficultyLevel::Intermediate);
        assert_eq!(level_for(1.99), DifficultyLevel::Intermediate);
        assert_eq!(level_for(2.0), DifficultyLevel::Advanced);
    }
}
