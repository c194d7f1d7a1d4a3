use crate::core::diagnostics::{locate_record, probe_bulk_payload_shape, track_cargo};
use crate::core::harness::CheckRecorder;
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints::RECORD_SEARCH_SOURCES;
use crate::domain::model::Role;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Incident diagnostics: which bulk-removal payload shape the service parses, and where
/// specific cargo records can still be found.
pub struct DiagnosticsScenario;

#[async_trait]
impl Scenario for DiagnosticsScenario {
    fn name(&self) -> &str {
        "diagnostics"
    }

    fn description(&self) -> &str {
        "bulk payload shape probe and missing-record search"
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        let operator = context.session(Role::WarehouseOperator).await?.clone();
        let settings = context.config().diagnostics.clone();

        if settings.probe_bulk_payload.unwrap_or(true) {
            match probe_bulk_payload_shape(&operator).await {
                Ok(probe) => {
                    let rejected = probe
                        .rejected
                        .iter()
                        .map(|r| format!("{} -> {} ({})", r.key, r.status, r.reason))
                        .collect::<Vec<_>>()
                        .join("; ");
                    checks.check(
                        "bulk removal accepts cargo_ids payload",
                        probe.accepts("cargo_ids"),
                        format!("accepted: [{}] rejected: [{}]", probe.accepted.join(", "), rejected),
                    );
                    if probe.accepts("ids") && !probe.accepts("cargo_ids") {
                        tracing::warn!("⚠️ Bulk removal only parses the legacy 'ids' payload");
                    }
                }
                Err(e) => checks.fail("bulk removal accepts cargo_ids payload", e.to_string()),
            }
        } else {
            checks.skip("bulk removal accepts cargo_ids payload", "probe disabled");
        }

        if settings.cargo_numbers.is_empty() {
            checks.skip("locate cargo", "no [diagnostics].cargo_numbers configured");
            return Ok(());
        }

        for number in &settings.cargo_numbers {
            let name = format!("locate cargo {}", number);
            let locations = locate_record(&operator, number, &RECORD_SEARCH_SOURCES).await;

            if !locations.is_empty() {
                let found = locations
                    .iter()
                    .map(|l| format!("{}#{}", l.endpoint, l.index))
                    .collect::<Vec<_>>()
                    .join(", ");
                checks.pass(&name, format!("found in {}", found));
                continue;
            }

            match track_cargo(&operator, number).await {
                Ok(Some(_)) => checks.pass(&name, "absent from every list, known to tracking"),
                Ok(None) => checks.fail(
                    &name,
                    format!("not found in {}", RECORD_SEARCH_SOURCES.join(", ")),
                ),
                Err(e) => checks.fail(&name, format!("not in any list; tracking failed: {}", e)),
            }
        }

        Ok(())
    }
}
