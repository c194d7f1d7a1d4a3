use crate::adapters::http::ApiResponse;
use crate::domain::model::{CheckResult, CheckStatus, CheckSummary};
use crate::utils::error::Result;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

/// Collects PASS / FAIL / SKIP results for the scenario currently running.
///
/// A failed check is recorded and logged; it never stops the caller.
#[derive(Debug, Default)]
pub struct CheckRecorder {
    scenario: String,
    results: Vec<CheckResult>,
}

impl CheckRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results recorded from now on are attributed to `scenario`.
    pub fn begin_scenario(&mut self, scenario: &str) {
        self.scenario = scenario.to_string();
    }

    pub fn current_scenario(&self) -> &str {
        &self.scenario
    }

    pub fn pass(&mut self, name: &str, details: impl Into<String>) {
        self.record(name, CheckStatus::Pass, details.into(), 0);
    }

    pub fn fail(&mut self, name: &str, details: impl Into<String>) {
        self.record(name, CheckStatus::Fail, details.into(), 0);
    }

    pub fn skip(&mut self, name: &str, reason: impl Into<String>) {
        self.record(name, CheckStatus::Skip, reason.into(), 0);
    }

    /// Records PASS when `condition` holds, FAIL otherwise. Returns `condition`.
    pub fn check(&mut self, name: &str, condition: bool, details: impl Into<String>) -> bool {
        let status = if condition {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        };
        self.record(name, status, details.into(), 0);
        condition
    }

    /// Awaits `check`; `Ok(details)` is a PASS and `Err(e)` a FAIL carrying the error text.
    pub async fn run_check<F, E>(&mut self, name: &str, check: F) -> bool
    where
        F: Future<Output = std::result::Result<String, E>>,
        E: Display,
    {
        let started = Instant::now();
        let outcome = check.await;
        let elapsed = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(details) => {
                self.record(name, CheckStatus::Pass, details, elapsed);
                true
            }
            Err(e) => {
                self.record(name, CheckStatus::Fail, e.to_string(), elapsed);
                false
            }
        }
    }

    /// Awaits one API call. A transport failure (timeout, refused connection) is recorded as a
    /// FAIL under `name` and yields `None`; any HTTP answer is handed back for the caller to check.
    pub async fn request<F>(&mut self, name: &str, call: F) -> Option<ApiResponse>
    where
        F: Future<Output = Result<ApiResponse>>,
    {
        let started = Instant::now();
        match call.await {
            Ok(response) => Some(response),
            Err(e) => {
                let elapsed = started.elapsed().as_millis() as u64;
                self.record(name, CheckStatus::Fail, e.to_string(), elapsed);
                None
            }
        }
    }

    pub fn expect_status(&mut self, name: &str, response: &ApiResponse, expected: u16) -> bool {
        let actual = response.status_code();
        let details = if actual == expected {
            format!("{} -> {}", response.endpoint, actual)
        } else {
            format!(
                "{} -> {} (expected {}): {}",
                response.endpoint,
                actual,
                expected,
                response.excerpt(300)
            )
        };
        self.check(name, actual == expected, details)
    }

    pub fn expect_success(&mut self, name: &str, response: &ApiResponse) -> bool {
        let details = if response.is_success() {
            format!("{} -> {}", response.endpoint, response.status)
        } else {
            format!(
                "{} -> {}: {}",
                response.endpoint,
                response.status,
                response.excerpt(300)
            )
        };
        self.check(name, response.is_success(), details)
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn summary(&self) -> CheckSummary {
        CheckSummary::from_results(&self.results)
    }

    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }

    fn record(&mut self, name: &str, status: CheckStatus, details: String, duration_ms: u64) {
        match status {
            CheckStatus::Pass => tracing::info!("✅ PASS [{}] {}: {}", self.scenario, name, details),
            CheckStatus::Fail => tracing::error!("❌ FAIL [{}] {}: {}", self.scenario, name, details),
            CheckStatus::Skip => tracing::info!("⏭️ SKIP [{}] {}: {}", self.scenario, name, details),
        }

        self.results.push(CheckResult {
            scenario: self.scenario.clone(),
            name: name.to_string(),
            status,
            details,
            duration_ms,
        });
    }
}
