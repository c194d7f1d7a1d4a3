pub mod diagnostics;
pub mod harness;
pub mod inspect;
pub mod report;
pub mod suite;

pub use crate::domain::model::{CheckResult, CheckStatus, SuiteReport};
pub use crate::domain::ports::{Scenario, Storage};
pub use crate::utils::error::Result;
pub use harness::CheckRecorder;
pub use suite::{ScenarioContext, ScenarioSuite};
