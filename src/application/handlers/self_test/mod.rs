//! Self-test handler.


pub use run_self_test::{RunSelfTestCommand, RunSelfTestHandler};
