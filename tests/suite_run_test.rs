use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use tajline_smoke::core::report::{write_report, JSON_REPORT};
use tajline_smoke::{build_suite, CheckStatus, LocalStorage, ScenarioContext, SuiteConfig};
use tempfile::TempDir;

const ROLES: [(&str, &str, &str, &str); 3] = [
    ("+79999888777", "admin123", "admin_token", "admin"),
    ("+79777888999", "warehouse123", "operator_token", "warehouse_operator"),
    ("+79991234567", "courier123", "courier_token", "courier"),
];

fn suite_config(base_url: &str, output_path: &str) -> SuiteConfig {
    SuiteConfig::from_toml_str(&format!(
        r#"
[suite]
name = "tajline-readonly"

[target]
base_url = "{base_url}"
timeout_seconds = 5

[credentials.admin]
phone = "+79999888777"
password = "admin123"

[credentials.operator]
phone = "+79777888999"
password = "warehouse123"

[credentials.courier]
phone = "+79991234567"
password = "courier123"

[diagnostics]
cargo_numbers = ["250102"]

[report]
output_path = "{output_path}"
formats = ["json", "csv"]
"#
    ))
    .unwrap()
}

/// 模擬整個唯讀流程所需的端點
async fn mock_readonly_target(server: &MockServer) {
    for (phone, password, token, role) in ROLES {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/auth/login")
                    .json_body(json!({"phone": phone, "password": password}));
                then.status(200).json_body(json!({
                    "access_token": token,
                    "user": {"role": role}
                }));
            })
            .await;

        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/auth/login")
                    .json_body(json!({"phone": phone, "password": format!("{password}-wrong")}));
                then.status(401).json_body(json!({"detail": "Неверный пароль"}));
            })
            .await;

        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/auth/me")
                    .header("authorization", format!("Bearer {token}"));
                then.status(200).json_body(json!({"role": role, "phone": phone}));
            })
            .await;
    }

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/operator/cargo/available-for-placement")
                .header("authorization", "Bearer operator_token");
            then.status(200).json_body(json!({
                "items": [
                    {"id": "c1", "cargo_number": "250101",
                     "individual_items": [{"individual_number": "250101/01/1", "is_placed": false}]},
                    {"id": "c2", "cargo_number": "250102"}
                ],
                "pagination": {"total": 2}
            }));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/operator/warehouses");
            then.status(200).json_body(json!([{"id": "w1", "name": "Душанбе"}]));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/warehouses/w1/layout-with-cargo");
            then.status(200).json_body(json!({
                "total_cargo": 1,
                "occupied_cells": 1,
                "layout": {"blocks": [{"shelves": [{"cells": [
                    {"is_occupied": true,
                     "cargo": [{"cargo_number": "250100", "individual_number": "250100/01/1"}]},
                    {"is_occupied": false}
                ]}]}]}
            }));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/courier/requests/new")
                .header("authorization", "Bearer courier_token");
            then.status(200).json_body(json!({"requests": [{"id": "r1"}]}));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/operator/pickup-requests");
            then.status(200)
                .json_body(json!([{"id": "r1", "request_number": "100001"}]));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/operator/warehouse-notifications");
            then.status(200).json_body(json!({
                "notifications": [
                    {"id": "n1", "status": "pending"},
                    {"id": "n2", "status": "accepted"}
                ],
                "pending_count": 1
            }));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/bulk-remove-from-placement")
                .body_contains("cargo_ids");
            then.status(200).json_body(json!({
                "success": true,
                "deleted_count": 0,
                "total_requested": 1
            }));
        })
        .await;
}

#[tokio::test]
async fn readonly_suite_passes_and_writes_report() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_readonly_target(&server).await;

    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_string_lossy().to_string();
    let config = suite_config(&server.base_url(), &output_path);

    let suite = build_suite(&config)?;
    assert_eq!(suite.len(), 7);

    let report_config = config.report.clone();
    let mut context = ScenarioContext::new(config);
    let report = suite.run(&mut context).await;

    let failures: Vec<String> = report
        .failures()
        .map(|f| format!("[{}] {}: {}", f.scenario, f.name, f.details))
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {:#?}", failures);
    assert_eq!(report.exit_code(), 0);

    // 未開啟 mutations：removal 整個跳過，其餘寫入動作也跳過
    let removal = report
        .results
        .iter()
        .find(|r| r.scenario == "removal")
        .unwrap();
    assert_eq!(removal.status, CheckStatus::Skip);
    assert!(report
        .results
        .iter()
        .any(|r| r.name == "accept notification" && r.status == CheckStatus::Skip));
    assert!(report
        .results
        .iter()
        .any(|r| r.name == "locate cargo 250102" && r.status == CheckStatus::Pass));
    assert!(report
        .results
        .iter()
        .any(|r| r.name == "bulk removal accepts cargo_ids payload" && r.status == CheckStatus::Pass));

    let storage = LocalStorage::new(&report_config.output_path);
    let written = write_report(&storage, &report_config, &report).await?;
    assert_eq!(written, vec!["report.json", "report.csv"]);

    let json_text = std::fs::read_to_string(temp_dir.path().join(JSON_REPORT))?;
    let saved: serde_json::Value = serde_json::from_str(&json_text)?;
    assert_eq!(saved["suite"], "tajline-readonly");

    let csv_text = std::fs::read_to_string(temp_dir.path().join("report.csv"))?;
    assert!(csv_text.starts_with("scenario,check,status,duration_ms,details"));
    Ok(())
}

#[tokio::test]
async fn unreachable_target_fails_every_scenario() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = suite_config("http://127.0.0.1:9", &temp_dir.path().to_string_lossy());
    config.suite.scenarios = vec!["auth".to_string(), "placement".to_string()];
    config.target.timeout_seconds = 2;

    let suite = build_suite(&config)?;
    let mut context = ScenarioContext::new(config);
    let report = suite.run(&mut context).await;

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 1);

    for scenario in ["auth", "placement"] {
        assert!(
            report
                .results
                .iter()
                .any(|r| r.scenario == scenario && r.status == CheckStatus::Fail),
            "{scenario} should report a failure"
        );
    }
    Ok(())
}
