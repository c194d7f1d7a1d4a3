use crate::core::harness::CheckRecorder;
use crate::core::suite::ScenarioContext;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One smoke-test script: authenticate, call endpoints, record checks.
///
/// Returning `Err` aborts the remaining steps of this scenario only; the suite records the
/// error as a failed check and continues with the next scenario.
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Whether the scenario creates, changes or deletes records on the target system.
    fn mutates(&self) -> bool {
        false
    }

    fn should_run(&self, _context: &ScenarioContext) -> bool {
        true
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()>;
}
