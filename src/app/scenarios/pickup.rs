use super::{check_unique_ids, fetch_list};
use crate::core::diagnostics::locate_record;
use crate::core::harness::CheckRecorder;
use crate::core::inspect::field_str;
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints;
use crate::domain::model::Role;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;

pub struct PickupScenario;

#[async_trait]
impl Scenario for PickupScenario {
    fn name(&self) -> &str {
        "pickup"
    }

    fn description(&self) -> &str {
        "courier and operator pickup request lists, request creation"
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        if context.has_credentials(Role::Courier) {
            match context.session(Role::Courier).await.cloned() {
                Ok(courier) => {
                    if let Some(requests) = fetch_list(
                        &courier,
                        endpoints::COURIER_NEW_REQUESTS,
                        "courier new requests",
                        checks,
                    )
                    .await
                    {
                        check_unique_ids(checks, "courier new requests", &requests);
                    }
                }
                Err(e) => checks.fail("courier new requests", e.to_string()),
            }
        } else {
            checks.skip("courier new requests", "no courier credentials");
        }

        let operator = context.session(Role::WarehouseOperator).await?.clone();
        if let Some(requests) = fetch_list(
            &operator,
            endpoints::OPERATOR_PICKUP_REQUESTS,
            "operator pickup requests",
            checks,
        )
        .await
        {
            check_unique_ids(checks, "operator pickup requests", &requests);
        }

        if !context.allow_mutations() {
            checks.skip("create pickup request", "mutations disabled");
            return Ok(());
        }
        let Some(template) = context.config().pickup.request_template.clone() else {
            checks.skip("create pickup request", "no [pickup.request_template] configured");
            return Ok(());
        };
        if !context.has_credentials(Role::Admin) {
            checks.skip("create pickup request", "no admin credentials");
            return Ok(());
        }

        let admin = match context.session(Role::Admin).await.cloned() {
            Ok(admin) => admin,
            Err(e) => {
                checks.fail("create pickup request", e.to_string());
                return Ok(());
            }
        };
        let created = checks
            .request(
                "create pickup request",
                admin.post_json(endpoints::ADMIN_CREATE_PICKUP_REQUEST, &template),
            )
            .await;
        let Some(response) = created else {
            return Ok(());
        };
        if !checks.expect_success("create pickup request", &response) {
            return Ok(());
        }

        let number = field_str(&response.body, "request_number")
            .or_else(|| field_str(&response.body, "request_id"))
            .or_else(|| field_str(&response.body, "id"));
        let Some(number) = number else {
            checks.fail(
                "created request has a number",
                format!("no request_number/request_id/id in {}", response.excerpt(200)),
            );
            return Ok(());
        };
        checks.pass("created request has a number", number.clone());

        let locations = locate_record(&operator, &number, &[endpoints::OPERATOR_PICKUP_REQUESTS]).await;
        checks.check(
            "created request visible to operator",
            !locations.is_empty(),
            if locations.is_empty() {
                format!("{} not found in {}", number, endpoints::OPERATOR_PICKUP_REQUESTS)
            } else {
                format!("{} at position {}", number, locations[0].index)
            },
        );

        Ok(())
    }
}
