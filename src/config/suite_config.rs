use crate::app::scenarios::SCENARIO_ORDER;
use crate::domain::model::{Credentials, Role};
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_phone, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

pub const REPORT_FORMATS: [&str; 2] = ["json", "csv"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub suite: SuiteInfo,
    pub target: TargetConfig,
    /// Keyed by role: `admin`, `operator` (or `warehouse_operator`), `courier`.
    pub credentials: HashMap<String, Credentials>,
    pub placement: PlacementConfig,
    pub layout: LayoutConfig,
    pub removal: RemovalConfig,
    pub pickup: PickupConfig,
    pub diagnostics: DiagnosticsConfig,
    pub report: ReportConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteInfo {
    pub name: String,
    /// Scenario names in execution order; empty means all of them in the default order.
    pub scenarios: Vec<String>,
    /// Scenarios that place, remove, accept or create records only run when set.
    pub allow_mutations: bool,
}

impl Default for SuiteInfo {
    fn default() -> Self {
        Self {
            name: "tajline-smoke".to_string(),
            scenarios: Vec::new(),
            allow_mutations: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tajline.tj".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Cell that the placement scenario puts a unit into.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub warehouse_id: Option<String>,
    pub block_number: Option<u32>,
    pub shelf_number: Option<u32>,
    pub cell_number: Option<u32>,
}

impl PlacementConfig {
    pub fn target(&self) -> Option<(&str, u32, u32, u32)> {
        Some((
            self.warehouse_id.as_deref()?,
            self.block_number?,
            self.shelf_number?,
            self.cell_number?,
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Falls back to the first warehouse of the operator.
    pub warehouse_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalConfig {
    pub bulk_batch_size: usize,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self { bulk_batch_size: 2 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// JSON body posted to create a pickup request; creation is skipped when absent.
    pub request_template: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Cargo numbers to look up across the list endpoints.
    pub cargo_numbers: Vec<String>,
    pub probe_bulk_payload: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub enabled: bool,
    pub output_path: String,
    pub formats: Vec<String>,
    pub compress: bool,
    pub filename_pattern: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_path: "./smoke-report".to_string(),
            formats: vec!["json".to_string(), "csv".to_string()],
            compress: false,
            filename_pattern: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

fn is_unresolved(value: &str) -> bool {
    env_var_pattern().is_match(value)
}

impl SuiteConfig {
    /// Loads a suite TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a suite TOML string after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SmokeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("Suite TOML parsing error: {}", e),
        })
    }

    /// Defaults plus `TAJLINE_BASE_URL` and `TAJLINE_<ROLE>_PHONE` / `_PASSWORD`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("TAJLINE_BASE_URL") {
            config.target.base_url = base_url;
        }

        for role in Role::ALL {
            let prefix = role.env_prefix();
            let phone = std::env::var(format!("{}_PHONE", prefix));
            let password = std::env::var(format!("{}_PASSWORD", prefix));
            if let (Ok(phone), Ok(password)) = (phone, password) {
                config
                    .credentials
                    .insert(role.as_api_str().to_string(), Credentials { phone, password });
            }
        }

        config
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Credentials for `role`, ignoring entries whose placeholders were not substituted.
    ///
    /// When several aliases of one role survive (`operator` and `warehouse_operator`), the
    /// alphabetically first key wins; [`validate_config`](Self::validate_config) rejects that.
    pub fn credentials_for(&self, role: Role) -> Option<&Credentials> {
        self.credentials
            .iter()
            .filter(|(key, _)| key.parse::<Role>().ok() == Some(role))
            .filter(|(_, creds)| !is_unresolved(&creds.phone) && !is_unresolved(&creds.password))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, creds)| creds)
    }

    pub fn configured_roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.credentials_for(*role).is_some())
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.target.timeout_seconds)
    }

    /// Scenario names to run, in order.
    pub fn scenario_order(&self) -> Vec<String> {
        if self.suite.scenarios.is_empty() {
            SCENARIO_ORDER.iter().map(|s| s.to_string()).collect()
        } else {
            self.suite.scenarios.clone()
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("suite.name", &self.suite.name)?;
        validate_url("target.base_url", &self.target.base_url)?;
        validate_range("target.timeout_seconds", self.target.timeout_seconds, 1, 300)?;

        for name in &self.suite.scenarios {
            if !SCENARIO_ORDER.contains(&name.as_str()) {
                return Err(SmokeError::InvalidConfigValueError {
                    field: "suite.scenarios".to_string(),
                    value: name.clone(),
                    reason: format!("Known scenarios: {}", SCENARIO_ORDER.join(", ")),
                });
            }
        }

        let mut keys: Vec<&String> = self.credentials.keys().collect();
        keys.sort();
        let mut seen: HashMap<Role, &String> = HashMap::new();
        for key in keys {
            let role = key
                .parse::<Role>()
                .map_err(|reason| SmokeError::InvalidConfigValueError {
                    field: "credentials".to_string(),
                    value: key.clone(),
                    reason,
                })?;
            if let Some(first) = seen.insert(role, key) {
                return Err(SmokeError::InvalidConfigValueError {
                    field: "credentials".to_string(),
                    value: key.clone(),
                    reason: format!("duplicates credentials.{} (both are {})", first, role),
                });
            }
        }

        for (key, creds) in &self.credentials {
            if is_unresolved(&creds.phone) || is_unresolved(&creds.password) {
                tracing::warn!(
                    "⚠️ credentials.{} references an unset environment variable, role will be skipped",
                    key
                );
                continue;
            }
            validate_phone(&format!("credentials.{}.phone", key), &creds.phone)?;
            validate_non_empty_string(&format!("credentials.{}.password", key), &creds.password)?;
        }

        if self.removal.bulk_batch_size == 0 {
            return Err(SmokeError::InvalidConfigValueError {
                field: "removal.bulk_batch_size".to_string(),
                value: "0".to_string(),
                reason: "Value must be at least 1".to_string(),
            });
        }

        if let Some(template) = &self.pickup.request_template {
            if !template.is_object() {
                return Err(SmokeError::ConfigValidationError {
                    field: "pickup.request_template".to_string(),
                    message: "must be a table".to_string(),
                });
            }
        }

        if self.report.enabled {
            validate_path("report.output_path", &self.report.output_path)?;
            validate_one_of("report.formats", &self.report.formats, &REPORT_FORMATS)?;
        }

        Ok(())
    }
}

impl Validate for SuiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_SUITE: &str = r#"
[suite]
name = "nightly"
scenarios = ["auth", "layout", "diagnostics"]

[target]
base_url = "https://tajline.tj"
timeout_seconds = 15

[credentials.admin]
phone = "+79999888777"
password = "admin123"

[credentials.operator]
phone = "+79777888999"
password = "warehouse123"

[placement]
warehouse_id = "wh-1"
block_number = 1
shelf_number = 2
cell_number = 3

[pickup.request_template]
sender_full_name = "Smoke Test"
sender_phone = "+992900000000"
pickup_address = "Душанбе, ул. Рудаки 1"

[diagnostics]
cargo_numbers = ["250101", "250102"]

[report]
output_path = "./out"
formats = ["json"]
compress = true
"#;

    #[test]
    fn test_parse_full_suite() {
        let config = SuiteConfig::from_toml_str(FULL_SUITE).unwrap();

        assert_eq!(config.suite.name, "nightly");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.scenario_order(), vec!["auth", "layout", "diagnostics"]);
        assert_eq!(
            config.configured_roles(),
            vec![Role::Admin, Role::WarehouseOperator]
        );
        assert_eq!(config.placement.target(), Some(("wh-1", 1, 2, 3)));
        assert!(config.pickup.request_template.as_ref().unwrap().is_object());
        assert!(config.report.compress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = SuiteConfig::from_toml_str("").unwrap();

        assert_eq!(config.target.timeout_seconds, 30);
        assert!(!config.suite.allow_mutations);
        assert_eq!(config.removal.bulk_batch_size, 2);
        assert_eq!(config.scenario_order().len(), SCENARIO_ORDER.len());
        assert!(config.placement.target().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SMOKE_TEST_COURIER_PHONE", "+992911111111");

        let config = SuiteConfig::from_toml_str(
            r#"
[credentials.courier]
phone = "${SMOKE_TEST_COURIER_PHONE}"
password = "${SMOKE_TEST_UNSET_PASSWORD_VAR}"
"#,
        )
        .unwrap();

        let creds = &config.credentials["courier"];
        assert_eq!(creds.phone, "+992911111111");
        assert_eq!(creds.password, "${SMOKE_TEST_UNSET_PASSWORD_VAR}");
        assert!(config.credentials_for(Role::Courier).is_none());

        std::env::remove_var("SMOKE_TEST_COURIER_PHONE");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad_url = SuiteConfig::from_toml_str("[target]\nbase_url = \"tajline\"").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_scenario =
            SuiteConfig::from_toml_str("[suite]\nscenarios = [\"auth\", \"billing\"]").unwrap();
        assert!(bad_scenario.validate().is_err());

        let bad_role = SuiteConfig::from_toml_str(
            "[credentials.client]\nphone = \"1\"\npassword = \"2\"",
        )
        .unwrap();
        assert!(bad_role.validate().is_err());

        let duplicate_alias = SuiteConfig::from_toml_str(
            r#"
[credentials.operator]
phone = "+79777888999"
password = "warehouse123"

[credentials.warehouse_operator]
phone = "+79777888000"
password = "other"
"#,
        )
        .unwrap();
        let err = duplicate_alias.validate().unwrap_err().to_string();
        assert!(err.contains("credentials.operator"), "{}", err);
        // 無論 HashMap 順序為何都取同一組
        for _ in 0..8 {
            assert_eq!(
                duplicate_alias
                    .credentials_for(Role::WarehouseOperator)
                    .unwrap()
                    .phone,
                "+79777888999"
            );
        }

        let bad_format = SuiteConfig::from_toml_str("[report]\nformats = [\"xml\"]").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_timeout = SuiteConfig::from_toml_str("[target]\ntimeout_seconds = 0").unwrap();
        assert!(bad_timeout.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL_SUITE.as_bytes()).unwrap();

        let config = SuiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.diagnostics.cargo_numbers, vec!["250101", "250102"]);
    }

    #[test]
    fn test_sample_suite_file_is_valid() {
        let config =
            SuiteConfig::from_toml_str(include_str!("../../smoke.example.toml")).unwrap();

        assert_eq!(config.suite.name, "tajline-nightly");
        assert_eq!(config.scenario_order().len(), SCENARIO_ORDER.len());
        assert!(!config.suite.allow_mutations);
        assert_eq!(config.credentials.len(), 3);
        assert!(config.validate().is_ok());
    }
}
