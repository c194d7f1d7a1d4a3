use super::{fetch_list, REMOVED_CARGO_KEY};
use crate::core::harness::CheckRecorder;
use crate::core::inspect::{deleted_count_matches, field_str, position_of_record, record_id};
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints;
use crate::domain::model::Role;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Removes cargo from the placement list, one through the individual endpoint and a batch
/// through the bulk endpoint, then checks they are gone.
pub struct RemovalScenario;

#[async_trait]
impl Scenario for RemovalScenario {
    fn name(&self) -> &str {
        "removal"
    }

    fn description(&self) -> &str {
        "individual and bulk remove-from-placement"
    }

    fn mutates(&self) -> bool {
        true
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        let operator = context.session(Role::WarehouseOperator).await?.clone();
        let batch_size = context.config().removal.bulk_batch_size;

        let Some(items) = fetch_list(
            &operator,
            endpoints::CARGO_AVAILABLE_FOR_PLACEMENT,
            "available-for-placement",
            checks,
        )
        .await
        else {
            return Ok(());
        };

        let ids: Vec<String> = items.iter().filter_map(record_id).collect();
        if ids.is_empty() {
            checks.skip("remove from placement", "placement list is empty");
            return Ok(());
        }

        let mut removed = Vec::new();

        let single = &ids[0];
        let path = endpoints::cargo_remove_from_placement(single);
        let response = checks.request("remove single cargo", operator.delete(&path)).await;
        if let Some(response) =
            response.filter(|response| checks.expect_success("remove single cargo", response))
        {
            let success = response.body.get("success").and_then(Value::as_bool);
            checks.check(
                "single removal reports success",
                success == Some(true),
                format!(
                    "cargo {} ({})",
                    field_str(&response.body, "cargo_number").unwrap_or_else(|| single.clone()),
                    response.excerpt(150)
                ),
            );
            removed.push(single.clone());
        }

        let batch: Vec<String> = ids.iter().skip(1).take(batch_size).cloned().collect();
        if batch.is_empty() {
            checks.skip("bulk remove cargo", "not enough cargo left for a bulk removal");
        } else {
            let payload = json!({ "cargo_ids": batch });
            let response = checks
                .request(
                    "bulk remove cargo",
                    operator.delete_json(endpoints::CARGO_BULK_REMOVE_FROM_PLACEMENT, &payload),
                )
                .await;
            if let Some(response) =
                response.filter(|response| checks.expect_success("bulk remove cargo", response))
            {
                checks.check(
                    "bulk removal reports success",
                    response.body.get("success").and_then(Value::as_bool) == Some(true),
                    response.excerpt(150),
                );
                match deleted_count_matches(&response.body) {
                    Ok(count) => {
                        checks.check(
                            "bulk removal deleted every requested cargo",
                            count as usize == batch.len(),
                            format!("deleted {} of {} sent", count, batch.len()),
                        );
                    }
                    Err(reason) => checks.fail("bulk removal deleted every requested cargo", reason),
                }
                removed.extend(batch);
            }
        }

        if removed.is_empty() {
            return Ok(());
        }
        context.add_shared_data(REMOVED_CARGO_KEY, json!(removed));

        let Some(after) = fetch_list(
            &operator,
            endpoints::CARGO_AVAILABLE_FOR_PLACEMENT,
            "available-for-placement after removal",
            checks,
        )
        .await
        else {
            return Ok(());
        };

        let still_listed: Vec<&String> = removed
            .iter()
            .filter(|id| position_of_record(&after, id).is_some())
            .collect();
        checks.check(
            "removed cargo left the placement list",
            still_listed.is_empty(),
            if still_listed.is_empty() {
                format!("{} removed, {} remaining", removed.len(), after.len())
            } else {
                format!(
                    "still listed: {}",
                    still_listed
                        .iter()
                        .map(|id| id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            },
        );

        Ok(())
    }
}
