use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User types of the external system. Used only to pick which credentials to log in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[serde(alias = "operator")]
    WarehouseOperator,
    Courier,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::WarehouseOperator, Role::Courier];

    /// Role string as reported in `user.role` by the login endpoint.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::WarehouseOperator => "warehouse_operator",
            Role::Courier => "courier",
        }
    }

    /// Prefix for `TAJLINE_<ROLE>_PHONE` / `TAJLINE_<ROLE>_PASSWORD`.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Role::Admin => "TAJLINE_ADMIN",
            Role::WarehouseOperator => "TAJLINE_OPERATOR",
            Role::Courier => "TAJLINE_COURIER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "operator" | "warehouse_operator" => Ok(Role::WarehouseOperator),
            "courier" => Ok(Role::Courier),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub phone: String,
    pub password: String,
}

// Keep passwords out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("phone", &self.phone)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skip => "SKIP",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub scenario: String,
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CheckSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut summary = CheckSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.status {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Fail => summary.failed += 1,
                CheckStatus::Skip => summary.skipped += 1,
            }
        }
        summary
    }

    /// Percentage of executed (non-skipped) checks that passed.
    pub fn success_rate(&self) -> f64 {
        let executed = self.passed + self.failed;
        if executed == 0 {
            return 0.0;
        }
        self.passed as f64 / executed as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
}

impl SuiteReport {
    pub fn summary(&self) -> CheckSummary {
        CheckSummary::from_results(&self.results)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|r| r.status == CheckStatus::Fail)
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
