//! Self-test stages.

use serde::Serialize;

use crate::domain::foundation::StateMachine;

/// Stage of the self-test probe.
///
/// ```text
/// Start ──> ListCheck ──> WriteCheck ──> Done
///   │           │                        ^
///   └───────────┴────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTestStage {
    /// Configuration present and credentials accepted.
    Start,
    /// Folder listing works.
    ListCheck,
    /// Create, write and read back a probe document.
    WriteCheck,
    Done,
}

impl SelfTestStage {
    /// Name recorded in the step result.
    pub fn step_name(&self) -> &'static str {
        match self {
            SelfTestStage::Start => "start",
            SelfTestStage::ListCheck => "list_check",
            SelfTestStage::WriteCheck => "write_check",
            SelfTestStage::Done => "done",
        }
    }
}

impl StateMachine for SelfTestStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SelfTestStage::*;
        matches!(
            (self, target),
            (Start, ListCheck)
                | (Start, Done)
                | (ListCheck, WriteCheck)
                | (ListCheck, Done)
                | (WriteCheck, Done)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SelfTestStage::*;
        match self {
            Start => vec![ListCheck, Done],
            ListCheck => vec![WriteCheck, Done],
            WriteCheck => vec![Done],
            Done => vec![],
        }
    }
}
