//! Self-test module - probe stages and the report they produce.

mod report;
mod stage;

pub use report::{SelfTestMode, SelfTestReport, StepResult};
pub use stage::SelfTestStage;
