//! Heuristics for recurring incidents on the target: bulk-removal payload shape mismatches and
//! records that disappear from the list they are expected in.

use crate::adapters::http::ApiSession;
use crate::core::inspect::{extract_items, position_of_record, LIST_KEYS};
use crate::domain::endpoints;
use crate::utils::error::Result;
use serde_json::{json, Map, Value};

/// Id sent by the payload probe. No record on the target carries it.
pub const PROBE_SENTINEL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Request shapes the bulk-removal endpoint has been seen to expect.
pub const BULK_PAYLOAD_KEYS: [&str; 2] = ["cargo_ids", "ids"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedShape {
    pub key: &'static str,
    pub status: u16,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct PayloadProbe {
    pub accepted: Vec<&'static str>,
    pub rejected: Vec<RejectedShape>,
}

impl PayloadProbe {
    pub fn accepts(&self, key: &str) -> bool {
        self.accepted.contains(&key)
    }
}

/// Sends the bulk-removal request once per payload shape, each naming only the sentinel id.
///
/// A shape counts as rejected when the service answers 422, or 400 with an error that names a
/// payload field. Any other answer (including "nothing deleted") means the shape was parsed.
pub async fn probe_bulk_payload_shape(session: &ApiSession) -> Result<PayloadProbe> {
    let mut probe = PayloadProbe::default();

    for key in BULK_PAYLOAD_KEYS {
        let mut body = Map::new();
        body.insert(key.to_string(), json!([PROBE_SENTINEL_ID]));
        let payload = Value::Object(body);
        let response = session
            .delete_json(endpoints::CARGO_BULK_REMOVE_FROM_PLACEMENT, &payload)
            .await?;
        let detail = response.error_detail().unwrap_or_else(|| response.excerpt(200));

        let schema_rejection = response.status_code() == 422
            || (response.status_code() == 400
                && BULK_PAYLOAD_KEYS.iter().any(|k| detail.contains(k)));

        tracing::debug!(
            "🔬 bulk payload '{}' -> {} ({})",
            key,
            response.status,
            detail
        );

        if schema_rejection {
            probe.rejected.push(RejectedShape {
                key,
                status: response.status_code(),
                reason: detail,
            });
        } else {
            probe.accepted.push(key);
        }
    }

    Ok(probe)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    pub endpoint: String,
    pub index: usize,
}

/// Looks for `needle` (cargo number, request number or id) in each list endpoint of `sources`.
///
/// Endpoints that fail or do not return a list are logged and skipped.
pub async fn locate_record(
    session: &ApiSession,
    needle: &str,
    sources: &[&str],
) -> Vec<RecordLocation> {
    let mut found = Vec::new();

    for source in sources {
        let response = match session.get(source).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("🔎 {}: request failed: {}", source, e);
                continue;
            }
        };

        if !response.is_success() {
            tracing::warn!("🔎 {}: HTTP {}", source, response.status);
            continue;
        }

        let Some(items) = extract_items(&response.body, &LIST_KEYS) else {
            tracing::warn!("🔎 {}: response carries no list", source);
            continue;
        };

        if let Some(index) = position_of_record(items, needle) {
            tracing::info!("🔎 '{}' found in {} at position {}", needle, source, index);
            found.push(RecordLocation {
                endpoint: source.to_string(),
                index,
            });
        }
    }

    found
}

/// Tracking lookup for a single cargo number; `None` when the service does not know it.
pub async fn track_cargo(session: &ApiSession, cargo_number: &str) -> Result<Option<Value>> {
    let response = session.get(&endpoints::cargo_track(cargo_number)).await?;
    if response.is_success() && !response.body.is_null() {
        Ok(Some(response.body))
    } else {
        Ok(None)
    }
}
