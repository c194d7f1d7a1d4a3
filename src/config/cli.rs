use crate::config::suite_config::SuiteConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tajline-smoke")]
#[command(about = "Smoke tests for the TAJLINE.TJ cargo logistics API")]
pub struct CliConfig {
    /// Suite TOML file; without it settings come from TAJLINE_* environment variables
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Scenario to run (repeatable or comma separated); defaults to all
    #[arg(long = "scenario", short = 's', value_delimiter = ',')]
    pub scenarios: Vec<String>,

    /// Run scenarios that place, remove, accept or create records
    #[arg(long)]
    pub allow_mutations: bool,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Do not write report files
    #[arg(long)]
    pub no_report: bool,

    /// Print the available scenarios and exit
    #[arg(long)]
    pub list_scenarios: bool,

    #[arg(long, help = "Log CPU and memory usage per scenario")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Suite settings from the file (or environment) with command-line overrides applied.
    pub fn load_suite_config(&self) -> Result<SuiteConfig> {
        let mut suite = match &self.config {
            Some(path) => {
                tracing::info!("📋 Loading suite config from {}", path.display());
                SuiteConfig::from_file(path)?
            }
            None => SuiteConfig::from_env(),
        };

        self.apply_overrides(&mut suite);
        suite.validate()?;
        Ok(suite)
    }

    pub fn apply_overrides(&self, suite: &mut SuiteConfig) {
        if let Some(base_url) = &self.base_url {
            suite.target.base_url = base_url.clone();
        }
        if !self.scenarios.is_empty() {
            suite.suite.scenarios = self.scenarios.clone();
        }
        if self.allow_mutations {
            suite.suite.allow_mutations = true;
        }
        if let Some(output_path) = &self.output_path {
            suite.report.output_path = output_path.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            suite.target.timeout_seconds = timeout;
        }
        if self.no_report {
            suite.report.enabled = false;
        }
        if self.monitor {
            suite.monitoring.enabled = true;
        }
    }
}
