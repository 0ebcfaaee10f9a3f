//! 采集状态机
//!
//! `Idle → Rendering → Parsing → Structuring → Persisting → (下一个 URL | Done)`
//!
//! 任一阶段失败或被跳过时直接回到 Idle，继续下一个 URL

use std::fmt::Display;

use tracing::{debug, warn};

/// 采集状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    Rendering,
    Parsing,
    Structuring,
    Persisting,
    Done,
}

impl IngestState {
    /// 是否允许从当前状态转移到 `next`
    pub fn can_transition(self, next: IngestState) -> bool {
        use IngestState::*;
        matches!(
            (self, next),
            (Idle, Rendering)
                | (Rendering, Parsing)
                | (Parsing, Structuring)
                | (Structuring, Persisting)
                | (Rendering | Parsing | Structuring | Persisting, Idle)
                | (Idle, Done)
        )
    }
}

impl Display for IngestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IngestState::Idle => "空闲",
            IngestState::Rendering => "渲染",
            IngestState::Parsing => "解析",
            IngestState::Structuring => "结构化",
            IngestState::Persisting => "持久化",
            IngestState::Done => "完成",
        };
        f.write_str(name)
    }
}

/// 记录当前状态及经历过的状态
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: IngestState,
    history: Vec<IngestState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: IngestState::Idle,
            history: vec![IngestState::Idle],
        }
    }

    pub fn current(&self) -> IngestState {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn history(&self) -> &[IngestState] {
        &self.history
    }

    /// 转移到下一个状态；非法转移只记录警告
    pub fn advance(&mut self, next: IngestState) {
        if self.current == next {
            return;
        }
        if !self.current.can_transition(next) {
            warn!("⚠️ 非预期的状态转移: {} → {}", self.current, next);
        }
        debug!("状态: {} → {}", self.current, next);
        self.current = next;
        self.history.push(next);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IngestState::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut sm = StateMachine::new();
        for state in [Rendering, Parsing, Structuring, Persisting, Idle, Done] {
            assert!(sm.current().can_transition(state), "{} → {}", sm.current(), state);
            sm.advance(state);
        }
        assert_eq!(sm.current(), Done);
        assert_eq!(sm.history().len(), 7);
    }

    #[test]
    fn test_failures_return_to_idle() {
        assert!(Rendering.can_transition(Idle));
        assert!(Parsing.can_transition(Idle));
        assert!(!Rendering.can_transition(Persisting));
        assert!(!Done.can_transition(Idle));
        assert!(!Persisting.can_transition(Done));
    }

    #[test]
    fn test_same_state_is_not_recorded() {
        let mut sm = StateMachine::new();
        sm.advance(Idle);
        assert_eq!(sm.history(), &[Idle]);
    }
}
