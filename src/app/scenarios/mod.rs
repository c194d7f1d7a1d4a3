//! The smoke-test scenarios. Each one is a flat sequence of
//! authenticate -> call endpoint -> assert fields -> record.

pub mod auth;
pub mod diagnostics;
pub mod layout;
pub mod notifications;
pub mod pickup;
pub mod placement;
pub mod removal;

use crate::adapters::http::ApiSession;
use crate::config::SuiteConfig;
use crate::core::harness::CheckRecorder;
use crate::core::inspect::{extract_items, find_duplicate_ids, items_missing_fields, LIST_KEYS};
use crate::core::suite::ScenarioSuite;
use crate::domain::ports::Scenario;
use crate::utils::error::{Result, SmokeError};
use serde_json::Value;

pub use auth::AuthScenario;
pub use diagnostics::DiagnosticsScenario;
pub use layout::LayoutScenario;
pub use notifications::NotificationsScenario;
pub use pickup::PickupScenario;
pub use placement::PlacementScenario;
pub use removal::RemovalScenario;

/// Default execution order.
pub const SCENARIO_ORDER: [&str; 7] = [
    "auth",
    "placement",
    "layout",
    "removal",
    "pickup",
    "notifications",
    "diagnostics",
];

/// Shared-data key: cargo list seen by the placement scenario.
pub const AVAILABLE_CARGO_KEY: &str = "available_cargo";
/// Shared-data key: individual number placed into a cell.
pub const PLACED_CARGO_KEY: &str = "placed_individual_number";
/// Shared-data key: ids removed from the placement list.
pub const REMOVED_CARGO_KEY: &str = "removed_cargo_ids";

pub fn build_scenario(name: &str) -> Option<Box<dyn Scenario>> {
    let scenario: Box<dyn Scenario> = match name {
        "auth" => Box::new(AuthScenario),
        "placement" => Box::new(PlacementScenario),
        "layout" => Box::new(LayoutScenario),
        "removal" => Box::new(RemovalScenario),
        "pickup" => Box::new(PickupScenario),
        "notifications" => Box::new(NotificationsScenario),
        "diagnostics" => Box::new(DiagnosticsScenario),
        _ => return None,
    };
    Some(scenario)
}

/// Suite with the scenarios selected by `config`, in its order.
pub fn build_suite(config: &SuiteConfig) -> Result<ScenarioSuite> {
    let mut suite =
        ScenarioSuite::new(config.suite.name.clone()).with_monitoring(config.monitoring.enabled);

    for name in config.scenario_order() {
        let scenario = build_scenario(&name).ok_or_else(|| SmokeError::InvalidConfigValueError {
            field: "suite.scenarios".to_string(),
            value: name.clone(),
            reason: format!("Known scenarios: {}", SCENARIO_ORDER.join(", ")),
        })?;
        suite.add_scenario(scenario);
    }

    Ok(suite)
}

/// GETs a list endpoint and records "<label> responds" and "<label> list shape".
/// Returns the items when both checks pass.
pub(crate) async fn fetch_list(
    session: &ApiSession,
    path: &str,
    label: &str,
    checks: &mut CheckRecorder,
) -> Option<Vec<Value>> {
    fetch_list_with_body(session, path, label, checks)
        .await
        .map(|(_, items)| items)
}

/// Like [`fetch_list`], also handing back the full response body for envelope fields.
pub(crate) async fn fetch_list_with_body(
    session: &ApiSession,
    path: &str,
    label: &str,
    checks: &mut CheckRecorder,
) -> Option<(Value, Vec<Value>)> {
    let responds = format!("{} responds", label);
    let response = checks.request(&responds, session.get(path)).await?;
    if !checks.expect_success(&responds, &response) {
        return None;
    }

    match extract_items(&response.body, &LIST_KEYS).cloned() {
        Some(items) => {
            checks.pass(
                &format!("{} list shape", label),
                format!("{} items", items.len()),
            );
            Some((response.body, items))
        }
        None => {
            checks.fail(
                &format!("{} list shape", label),
                format!("no item list in response: {}", response.excerpt(200)),
            );
            None
        }
    }
}

pub(crate) fn check_unique_ids(checks: &mut CheckRecorder, label: &str, items: &[Value]) -> bool {
    let duplicates = find_duplicate_ids(items, "id");
    let details = if duplicates.is_empty() {
        format!("{} distinct ids", items.len())
    } else {
        duplicates
            .iter()
            .map(|(id, count)| format!("{} x{}", id, count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    checks.check(&format!("{} has no duplicate ids", label), duplicates.is_empty(), details)
}

pub(crate) fn check_required_fields(
    checks: &mut CheckRecorder,
    label: &str,
    items: &[Value],
    fields: &[&str],
) -> bool {
    let incomplete = items_missing_fields(items, fields);
    let details = if incomplete.is_empty() {
        format!("all items carry {}", fields.join(", "))
    } else {
        incomplete
            .iter()
            .take(5)
            .map(|(index, missing)| format!("#{} missing {}", index, missing.join("/")))
            .collect::<Vec<_>>()
            .join("; ")
    };
    checks.check(
        &format!("{} items carry required fields", label),
        incomplete.is_empty(),
        details,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CheckStatus;
    use serde_json::json;

    #[test]
    fn every_known_name_builds() {
        for name in SCENARIO_ORDER {
            let scenario = build_scenario(name).unwrap();
            assert_eq!(scenario.name(), name);
        }
        assert!(build_scenario("billing").is_none());
    }

    #[test]
    fn only_removal_is_a_mutating_scenario() {
        let mutating: Vec<_> = SCENARIO_ORDER
            .iter()
            .filter(|name| build_scenario(name).unwrap().mutates())
            .collect();
        assert_eq!(mutating, vec![&"removal"]);
    }

    #[test]
    fn build_suite_follows_configured_order() {
        let mut config = SuiteConfig::default();
        config.suite.scenarios = vec!["diagnostics".to_string(), "auth".to_string()];
        let suite = build_suite(&config).unwrap();
        assert_eq!(suite.scenario_names(), vec!["diagnostics", "auth"]);

        config.suite.scenarios = vec!["billing".to_string()];
        assert!(build_suite(&config).is_err());
    }

    #[test]
    fn duplicate_and_field_checks_record_details() {
        let mut checks = CheckRecorder::new();
        let items = vec![
            json!({"id": "a", "cargo_number": "1"}),
            json!({"id": "a"}),
        ];

        assert!(!check_unique_ids(&mut checks, "cargo", &items));
        assert!(!check_required_fields(&mut checks, "cargo", &items, &["id", "cargo_number"]));

        let results = checks.into_results();
        assert_eq!(results[0].details, "a x2");
        assert_eq!(results[1].details, "#1 missing cargo_number");
        assert!(results.iter().all(|r| r.status == CheckStatus::Fail));
    }
}
