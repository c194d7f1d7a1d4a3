use super::{check_required_fields, check_unique_ids, fetch_list, AVAILABLE_CARGO_KEY, PLACED_CARGO_KEY};
use crate::core::harness::CheckRecorder;
use crate::core::inspect::{collect_cargo_numbers, field_str};
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints;
use crate::domain::model::Role;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Cargo awaiting placement: list checks, then (with mutations enabled and a target cell
/// configured) places one unit and looks for it in the warehouse layout.
pub struct PlacementScenario;

/// First individual unit not yet placed, from `individual_items` or the item itself.
pub fn first_unplaced_unit(items: &[Value]) -> Option<String> {
    items.iter().find_map(|item| {
        if let Some(units) = item.get("individual_items").and_then(Value::as_array) {
            units
                .iter()
                .filter(|unit| unit.get("is_placed").and_then(Value::as_bool) != Some(true))
                .find_map(|unit| field_str(unit, "individual_number"))
        } else {
            field_str(item, "individual_number")
        }
    })
}

#[async_trait]
impl Scenario for PlacementScenario {
    fn name(&self) -> &str {
        "placement"
    }

    fn description(&self) -> &str {
        "cargo available for placement and individual placement"
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        let operator = context.session(Role::WarehouseOperator).await?.clone();

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

        check_unique_ids(checks, "available-for-placement", &items);
        check_required_fields(checks, "available-for-placement", &items, &["id", "cargo_number"]);
        context.add_shared_data(AVAILABLE_CARGO_KEY, Value::Array(items.clone()));

        if !context.allow_mutations() {
            checks.skip("place individual unit", "mutations disabled");
            return Ok(());
        }

        let Some((warehouse_id, block, shelf, cell)) = context
            .config()
            .placement
            .target()
            .map(|(w, b, s, c)| (w.to_string(), b, s, c))
        else {
            checks.skip("place individual unit", "no [placement] target cell configured");
            return Ok(());
        };

        let Some(individual_number) = first_unplaced_unit(&items) else {
            checks.skip("place individual unit", "no unplaced individual units");
            return Ok(());
        };

        let payload = json!({
            "individual_number": individual_number,
            "warehouse_id": warehouse_id,
            "block_number": block,
            "shelf_number": shelf,
            "cell_number": cell,
        });
        let Some(response) = checks
            .request(
                "place individual unit",
                operator.post_json(endpoints::CARGO_PLACE_INDIVIDUAL, &payload),
            )
            .await
        else {
            return Ok(());
        };
        if !checks.expect_success("place individual unit", &response) {
            return Ok(());
        }
        checks.check(
            "placement response reports success",
            response.body.get("success").and_then(Value::as_bool) != Some(false),
            response.excerpt(200),
        );
        context.add_shared_data(PLACED_CARGO_KEY, json!(individual_number));

        let layout_path = endpoints::warehouse_layout_with_cargo(&warehouse_id);
        let Some(layout) = checks
            .request("layout after placement", operator.get(&layout_path))
            .await
        else {
            return Ok(());
        };
        if checks.expect_success("layout after placement", &layout) {
            let numbers = collect_cargo_numbers(&layout.body);
            checks.check(
                "placed unit visible in layout",
                numbers.iter().any(|n| n == &individual_number),
                format!(
                    "{} at {}-{}-{}, layout holds {} units",
                    individual_number,
                    block,
                    shelf,
                    cell,
                    numbers.len()
                ),
            );
        }

        Ok(())
    }
}
