use crate::adapters::http::ApiSession;
use crate::config::SuiteConfig;
use crate::core::harness::CheckRecorder;
use crate::domain::model::{Role, SuiteReport};
use crate::domain::ports::Scenario;
use crate::utils::error::{Result, SmokeError};
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// State carried from one scenario to the next: settings, logged-in sessions and shared data.
pub struct ScenarioContext {
    config: SuiteConfig,
    client: Client,
    sessions: HashMap<Role, ApiSession>,
    shared_data: HashMap<String, Value>,
    execution_id: String,
}

impl ScenarioContext {
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            sessions: HashMap::new(),
            shared_data: HashMap::new(),
            execution_id: format!("run-{}", Utc::now().format("%Y%m%dT%H%M%SZ")),
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn allow_mutations(&self) -> bool {
        self.config.suite.allow_mutations
    }

    pub fn has_credentials(&self, role: Role) -> bool {
        self.sessions.contains_key(&role) || self.config.credentials_for(role).is_some()
    }

    /// A fresh, unauthenticated session against the configured target.
    pub fn anonymous_session(&self, role: Role) -> Result<ApiSession> {
        ApiSession::with_client(
            self.client.clone(),
            &self.config.target.base_url,
            role,
            self.config.timeout(),
        )
    }

    /// Session logged in as `role`; the login happens on first use and is reused afterwards.
    pub async fn session(&mut self, role: Role) -> Result<&ApiSession> {
        if !self.sessions.contains_key(&role) {
            let credentials = self
                .config
                .credentials_for(role)
                .cloned()
                .ok_or_else(|| SmokeError::MissingConfigError {
                    field: format!("credentials.{}", role),
                })?;

            let mut session = self.anonymous_session(role)?;
            session.login(&credentials).await?;
            self.sessions.insert(role, session);
        }

        self.sessions
            .get(&role)
            .ok_or_else(|| SmokeError::MissingConfigError {
                field: format!("credentials.{}", role),
            })
    }

    /// Registers an already authenticated session, bypassing the login call.
    pub fn insert_session(&mut self, session: ApiSession) {
        self.sessions.insert(session.role(), session);
    }

    pub fn add_shared_data(&mut self, key: impl Into<String>, value: Value) {
        self.shared_data.insert(key.into(), value);
    }

    pub fn get_shared_data(&self, key: &str) -> Option<&Value> {
        self.shared_data.get(key)
    }
}

/// Runs scenarios strictly in order, one request at a time.
pub struct ScenarioSuite {
    name: String,
    scenarios: Vec<Box<dyn Scenario>>,
    monitor: Option<SystemMonitor>,
}

impl ScenarioSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scenarios: Vec::new(),
            monitor: None,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        if enabled {
            self.monitor = Some(SystemMonitor::new(true));
        }
        self
    }

    pub fn add_scenario(&mut self, scenario: Box<dyn Scenario>) {
        self.scenarios.push(scenario);
    }

    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub async fn run(&self, context: &mut ScenarioContext) -> SuiteReport {
        let started_at = Utc::now();
        let mut checks = CheckRecorder::new();

        tracing::info!(
            "🚀 Suite '{}' ({}) against {}: {} scenarios",
            self.name,
            context.execution_id(),
            context.config().target.base_url,
            self.scenarios.len()
        );
        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Suite started");
        }

        for scenario in &self.scenarios {
            checks.begin_scenario(scenario.name());

            if scenario.mutates() && !context.allow_mutations() {
                checks.skip(
                    "scenario",
                    "changes data on the target; rerun with --allow-mutations",
                );
                continue;
            }

            if !scenario.should_run(context) {
                checks.skip("scenario", "preconditions not met");
                continue;
            }

            tracing::info!("▶️ {}: {}", scenario.name(), scenario.description());
            let start_time = Instant::now();
            let before = checks.summary();

            if let Err(e) = scenario.run(context, &mut checks).await {
                tracing::error!("💥 {} aborted: {}", scenario.name(), e);
                tracing::error!("💡 {}", e.recovery_suggestion());
                checks.fail("aborted", e.to_string());
            }

            let after = checks.summary();
            tracing::info!(
                "⏹️ {} finished in {:?}: {} passed, {} failed, {} skipped",
                scenario.name(),
                start_time.elapsed(),
                after.passed - before.passed,
                after.failed - before.failed,
                after.skipped - before.skipped
            );

            if let Some(monitor) = &self.monitor {
                monitor.log_stats(scenario.name());
            }
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }

        SuiteReport {
            suite: self.name.clone(),
            base_url: context.config().target.base_url.clone(),
            started_at,
            finished_at: Utc::now(),
            results: checks.into_results(),
        }
    }
}
