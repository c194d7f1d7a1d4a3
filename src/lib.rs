pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ApiResponse, ApiSession, LocalStorage};
pub use app::scenarios::{build_scenario, build_suite};
pub use config::SuiteConfig;
pub use core::{CheckRecorder, ScenarioContext, ScenarioSuite};
pub use domain::model::{CheckResult, CheckStatus, Credentials, Role, SuiteReport};
pub use utils::error::{Result, SmokeError};
