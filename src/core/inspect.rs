//! Ad-hoc response-shape checks shared by the scenarios.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Keys under which list endpoints of the service wrap their items.
pub const LIST_KEYS: [&str; 7] = [
    "items",
    "cargo",
    "notifications",
    "requests",
    "warehouses",
    "data",
    "results",
];

/// Keys that identify a cargo unit inside layouts and lists, most specific first.
pub const CARGO_NUMBER_KEYS: [&str; 2] = ["individual_number", "cargo_number"];

/// Returns the list carried by `value`: either the value itself when it is an array, or the
/// array under the first matching key of `keys`.
pub fn extract_items<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Value::Array(items) = value {
        return Some(items);
    }
    keys.iter().find_map(|key| value.get(*key).and_then(Value::as_array))
}

/// Renders a string or number field as a string.
pub fn field_str(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads an unsigned count that may arrive as a number or numeric string.
pub fn field_u64(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn record_id(value: &Value) -> Option<String> {
    field_str(value, "id")
}

/// Ids that occur more than once under `key`, with their counts, sorted by id.
pub fn find_duplicate_ids(items: &[Value], key: &str) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        if let Some(id) = field_str(item, key) {
            *counts.entry(id).or_default() += 1;
        }
    }
    counts.into_iter().filter(|(_, count)| *count > 1).collect()
}

/// Names from `fields` that are absent or null in `value`.
pub fn missing_fields(value: &Value, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| value.get(**field).map_or(true, Value::is_null))
        .map(|field| field.to_string())
        .collect()
}

/// Items of `items` that miss at least one of `fields`, as `(index, missing)` pairs.
pub fn items_missing_fields(items: &[Value], fields: &[&str]) -> Vec<(usize, Vec<String>)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let missing = missing_fields(item, fields);
            (!missing.is_empty()).then_some((index, missing))
        })
        .collect()
}

/// Verifies a bulk-removal answer: `deleted_count` must equal `total_requested`.
pub fn deleted_count_matches(body: &Value) -> Result<u64, String> {
    let deleted = field_u64(body, "deleted_count")
        .ok_or_else(|| "response has no deleted_count".to_string())?;
    let requested = field_u64(body, "total_requested")
        .ok_or_else(|| "response has no total_requested".to_string())?;

    if deleted == requested {
        Ok(deleted)
    } else {
        Err(format!(
            "deleted_count {} != total_requested {}",
            deleted, requested
        ))
    }
}

/// Cargo units found anywhere inside `value`, in document order (duplicates kept).
///
/// An object whose descendants carry their own numbers (a cargo with `individual_items`) is
/// represented by those units only; otherwise by its own `individual_number` or `cargo_number`.
pub fn collect_cargo_numbers(value: &Value) -> Vec<String> {
    let mut numbers = Vec::new();
    walk_cargo_numbers(value, &mut numbers);
    numbers
}

fn walk_cargo_numbers(value: &Value, numbers: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            let before = numbers.len();
            for child in map.values() {
                if child.is_object() || child.is_array() {
                    walk_cargo_numbers(child, numbers);
                }
            }
            if numbers.len() == before {
                if let Some(number) = CARGO_NUMBER_KEYS
                    .iter()
                    .find_map(|key| field_str(value, key))
                {
                    numbers.push(number);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_cargo_numbers(item, numbers);
            }
        }
        _ => {}
    }
}

fn is_cell(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("is_occupied") || map.contains_key("cell_number")
}

fn collect_cells<'a>(value: &'a Value, cells: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) if is_cell(map) => cells.push(value),
        Value::Object(map) => map.values().for_each(|child| collect_cells(child, cells)),
        Value::Array(items) => items.iter().for_each(|item| collect_cells(item, cells)),
        _ => {}
    }
}

/// Cargo units listed in more than one cell of a layout.
///
/// A cell is the outermost object carrying `is_occupied` or `cell_number`; a unit repeated
/// inside one cell is not reported. Without recognisable cells, any repeated unit counts.
pub fn cargo_in_multiple_cells(layout: &Value) -> BTreeSet<String> {
    let mut cells = Vec::new();
    collect_cells(layout, &mut cells);
    if cells.is_empty() {
        return repeated(&collect_cargo_numbers(layout));
    }

    let mut cell_counts: BTreeMap<String, usize> = BTreeMap::new();
    for cell in cells {
        let units: BTreeSet<String> = collect_cargo_numbers(cell).into_iter().collect();
        for unit in units {
            *cell_counts.entry(unit).or_default() += 1;
        }
    }

    cell_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(unit, _)| unit)
        .collect()
}

/// Cells flagged `is_occupied: true` anywhere inside `value`.
pub fn count_occupied_cells(value: &Value) -> usize {
    match value {
        Value::Object(map) => {
            let own = usize::from(map.get("is_occupied").and_then(Value::as_bool) == Some(true));
            own + map.values().map(count_occupied_cells).sum::<usize>()
        }
        Value::Array(items) => items.iter().map(count_occupied_cells).sum(),
        _ => 0,
    }
}

/// Numbers that occur more than once in `numbers`.
pub fn repeated(numbers: &[String]) -> BTreeSet<String> {
    let mut seen: BTreeSet<&String> = BTreeSet::new();
    numbers
        .iter()
        .filter(|n| !seen.insert(*n))
        .cloned()
        .collect()
}

/// Whether an object in `items` carries `needle` as cargo number, request number or id.
pub fn position_of_record(items: &[Value], needle: &str) -> Option<usize> {
    const KEYS: [&str; 4] = ["cargo_number", "individual_number", "request_number", "id"];
    items.iter().position(|item| {
        KEYS.iter()
            .any(|key| field_str(item, key).as_deref() == Some(needle))
    })
}
