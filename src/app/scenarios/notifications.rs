use super::{check_required_fields, check_unique_ids, fetch_list_with_body};
use crate::core::harness::CheckRecorder;
use crate::core::inspect::{field_str, field_u64, record_id};
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints;
use crate::domain::model::Role;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

pub struct NotificationsScenario;

fn is_pending(notification: &Value) -> bool {
    field_str(notification, "status").as_deref() == Some("pending")
}

#[async_trait]
impl Scenario for NotificationsScenario {
    fn name(&self) -> &str {
        "notifications"
    }

    fn description(&self) -> &str {
        "warehouse notifications list and acceptance"
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        let operator = context.session(Role::WarehouseOperator).await?.clone();

        let Some((body, notifications)) = fetch_list_with_body(
            &operator,
            endpoints::WAREHOUSE_NOTIFICATIONS,
            "warehouse notifications",
            checks,
        )
        .await
        else {
            return Ok(());
        };

        let pending_reported = field_u64(&body, "pending_count");
        check_unique_ids(checks, "warehouse notifications", &notifications);
        check_required_fields(checks, "warehouse notifications", &notifications, &["id", "status"]);

        let pending: Vec<&Value> = notifications.iter().filter(|n| is_pending(n)).collect();
        if let Some(reported) = pending_reported {
            checks.check(
                "pending_count matches list",
                reported as usize == pending.len(),
                format!("pending_count {} vs {} pending in list", reported, pending.len()),
            );
        }

        if !context.allow_mutations() {
            checks.skip("accept notification", "mutations disabled");
            return Ok(());
        }
        let Some(target) = pending.first().and_then(|n| record_id(n)) else {
            checks.skip("accept notification", "no pending notifications");
            return Ok(());
        };

        let path = endpoints::accept_warehouse_notification(&target);
        let accepted = checks
            .request("accept notification", operator.post_json(&path, &json!({})))
            .await;
        if let Some(response) = accepted {
            checks.expect_success("accept notification", &response);
        }

        Ok(())
    }
}
