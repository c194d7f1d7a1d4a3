use super::PLACED_CARGO_KEY;
use crate::core::harness::CheckRecorder;
use crate::core::inspect::{
    cargo_in_multiple_cells, collect_cargo_numbers, count_occupied_cells, extract_items, field_u64,
    record_id, LIST_KEYS,
};
use crate::core::suite::ScenarioContext;
use crate::domain::endpoints;
use crate::domain::model::Role;
use crate::domain::ports::Scenario;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Read-only consistency checks on a warehouse layout.
pub struct LayoutScenario;

#[async_trait]
impl Scenario for LayoutScenario {
    fn name(&self) -> &str {
        "layout"
    }

    fn description(&self) -> &str {
        "warehouse layout-with-cargo consistency"
    }

    async fn run(&self, context: &mut ScenarioContext, checks: &mut CheckRecorder) -> Result<()> {
        let operator = context.session(Role::WarehouseOperator).await?.clone();

        let configured = context
            .config()
            .layout
            .warehouse_id
            .clone()
            .or_else(|| context.config().placement.warehouse_id.clone());

        let warehouse_id = match configured {
            Some(id) => id,
            None => {
                let Some(response) = checks
                    .request("operator warehouses", operator.get(endpoints::OPERATOR_WAREHOUSES))
                    .await
                else {
                    return Ok(());
                };
                if !checks.expect_success("operator warehouses", &response) {
                    return Ok(());
                }
                let first = extract_items(&response.body, &LIST_KEYS)
                    .and_then(|items| items.first())
                    .and_then(record_id);
                match first {
                    Some(id) => id,
                    None => {
                        checks.skip("layout-with-cargo", "operator has no warehouses");
                        return Ok(());
                    }
                }
            }
        };

        let layout_path = endpoints::warehouse_layout_with_cargo(&warehouse_id);
        let Some(response) = checks
            .request("layout-with-cargo", operator.get(&layout_path))
            .await
        else {
            return Ok(());
        };
        if !checks.expect_success("layout-with-cargo", &response) {
            return Ok(());
        }
        let layout = &response.body;

        let numbers = collect_cargo_numbers(layout);
        let twice = cargo_in_multiple_cells(layout);
        checks.check(
            "no cargo unit in two cells",
            twice.is_empty(),
            if twice.is_empty() {
                format!("{} units in warehouse {}", numbers.len(), warehouse_id)
            } else {
                format!(
                    "in several cells: {}",
                    twice.into_iter().collect::<Vec<_>>().join(", ")
                )
            },
        );

        match field_u64(layout, "total_cargo") {
            Some(total) => {
                checks.check(
                    "total_cargo matches layout",
                    total as usize == numbers.len(),
                    format!("total_cargo {} vs {} units in cells", total, numbers.len()),
                );
            }
            None => checks.skip("total_cargo matches layout", "response has no total_cargo"),
        }

        if let Some(reported) = field_u64(layout, "occupied_cells") {
            let counted = count_occupied_cells(layout);
            checks.check(
                "occupied_cells matches layout",
                reported as usize == counted,
                format!("occupied_cells {} vs {} flagged cells", reported, counted),
            );
        }

        let placed = context
            .get_shared_data(PLACED_CARGO_KEY)
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(placed) = placed {
            if context.config().placement.warehouse_id.as_deref() == Some(warehouse_id.as_str()) {
                checks.check(
                    "placed unit still in layout",
                    numbers.contains(&placed),
                    placed,
                );
            }
        }

        Ok(())
    }
}
