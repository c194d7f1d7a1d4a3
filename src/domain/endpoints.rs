//! Paths of the TAJLINE.TJ REST API exercised by the scenarios.
//!
//! The external service owns these contracts; they live here so every scenario builds the
//! same URLs.

pub const AUTH_LOGIN: &str = "/api/auth/login";
pub const AUTH_ME: &str = "/api/auth/me";

pub const CARGO_AVAILABLE_FOR_PLACEMENT: &str = "/api/operator/cargo/available-for-placement";
pub const CARGO_PLACE_INDIVIDUAL: &str = "/api/operator/cargo/place-individual";
pub const CARGO_BULK_REMOVE_FROM_PLACEMENT: &str =
    "/api/operator/cargo/bulk-remove-from-placement";
pub const OPERATOR_CARGO_LIST: &str = "/api/operator/cargo/list";

pub const OPERATOR_WAREHOUSES: &str = "/api/operator/warehouses";
pub const WAREHOUSE_NOTIFICATIONS: &str = "/api/operator/warehouse-notifications";

pub const OPERATOR_PICKUP_REQUESTS: &str = "/api/operator/pickup-requests";
pub const COURIER_NEW_REQUESTS: &str = "/api/courier/requests/new";
pub const ADMIN_CREATE_PICKUP_REQUEST: &str = "/api/admin/courier/pickup-request";

pub fn cargo_remove_from_placement(cargo_id: &str) -> String {
    format!("/api/operator/cargo/{}/remove-from-placement", cargo_id)
}

pub fn warehouse_layout_with_cargo(warehouse_id: &str) -> String {
    format!("/api/warehouses/{}/layout-with-cargo", warehouse_id)
}

pub fn accept_warehouse_notification(notification_id: &str) -> String {
    format!("{}/{}/accept", WAREHOUSE_NOTIFICATIONS, notification_id)
}

pub fn cargo_track(cargo_number: &str) -> String {
    format!("/api/cargo/track/{}", cargo_number)
}

/// List endpoints searched when a cargo record goes missing.
pub const RECORD_SEARCH_SOURCES: [&str; 3] = [
    CARGO_AVAILABLE_FOR_PLACEMENT,
    OPERATOR_CARGO_LIST,
    OPERATOR_PICKUP_REQUESTS,
];
