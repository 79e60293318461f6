//! Self-test report.

use serde::Serialize;
use serde_json::Value;

use super::stage::SelfTestStage;
use crate::domain::foundation::{DocumentId, FolderToken};

/// Whether the probe touches the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTestMode {
    ReadOnly,
    Write,
}

impl SelfTestMode {
    pub fn from_flag(run_write_test: bool) -> Self {
        if run_write_test {
            SelfTestMode::Write
        } else {
            SelfTestMode::ReadOnly
        }
    }
}

/// Outcome of one executed stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub step_name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl StepResult {
    pub fn passed(stage: SelfTestStage, detail: Option<Value>) -> Self {
        Self {
            step_name: stage.step_name().to_string(),
            ok: true,
            detail,
        }
    }

    pub fn failed(stage: SelfTestStage, detail: Value) -> Self {
        Self {
            step_name: stage.step_name().to_string(),
            ok: false,
            detail: Some(detail),
        }
    }
}

/// Ordered results of a self-test run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfTestReport {
    /// AND of every executed step.
    pub ok: bool,
    pub mode: SelfTestMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_token: Option<FolderToken>,
    /// Probe document left behind by the write check, if one was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_document_id: Option<DocumentId>,
    pub steps: Vec<StepResult>,
}

impl SelfTestReport {
    pub fn new(mode: SelfTestMode) -> Self {
        Self {
            ok: true,
            mode,
            folder_token: None,
            created_document_id: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: StepResult) {
        self.ok &= step.ok;
        self.steps.push(step);
    }

    /// First failed step, if any.
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.steps.iter().find(|step| !step.ok)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_is_and_of_steps() {
        let mut report = SelfTestReport::new(SelfTestMode::ReadOnly);
        report.record(StepResult::passed(SelfTestStage::Start, None));
        assert!(report.ok);

        report.record(StepResult::failed(SelfTestStage::ListCheck, json!("boom")));
        assert!(!report.ok);
        assert_eq!(report.first_failure().unwrap().step_name, "list_check");
        assert_eq!(report.step_names(), vec!["start", "list_check"]);
    }

    #[test]
    fn mode_from_flag() {
        assert_eq!(SelfTestMode::from_flag(true), SelfTestMode::Write);
        assert_eq!(SelfTestMode::from_flag(false), SelfTestMode::ReadOnly);
    }

    #[test]
    fn serializes_without_empty_optionals() {
        let mut report = SelfTestReport::new(SelfTestMode::ReadOnly);
        report.record(StepResult::passed(SelfTestStage::Start, None));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "read_only");
        assert_eq!(json["steps"][0]["step_name"], "start");
        assert!(json.get("created_document_id").is_none());
        assert!(json["steps"][0].get("detail").is_none());
    }
}
