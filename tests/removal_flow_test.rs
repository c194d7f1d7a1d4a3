use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use tajline_smoke::app::scenarios::{RemovalScenario, REMOVED_CARGO_KEY};
use tajline_smoke::core::CheckRecorder;
use tajline_smoke::domain::ports::Scenario;
use tajline_smoke::{CheckResult, CheckStatus, ScenarioContext, SuiteConfig};

fn operator_config(server: &MockServer) -> SuiteConfig {
    SuiteConfig::from_toml_str(&format!(
        r#"
[suite]
allow_mutations = true

[target]
base_url = "{}"
timeout_seconds = 5

[credentials.operator]
phone = "+79777888999"
password = "warehouse123"

[removal]
bulk_batch_size = 2
"#,
        server.base_url()
    ))
    .unwrap()
}

async fn mock_operator_login(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200).json_body(json!({
                "access_token": "operator_token",
                "user": {"role": "warehouse_operator"}
            }));
        })
        .await;
}

fn status_of(results: &[CheckResult], name: &str) -> CheckStatus {
    results
        .iter()
        .find(|r| r.name == name)
        .map(|r| r.status)
        .unwrap_or_else(|| panic!("missing check {name}"))
}

/// 單筆移除 + 批次移除，回應數量一致，但清單仍列出已移除的貨物
#[tokio::test]
async fn removal_flags_cargo_still_listed_after_removal() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_operator_login(&server).await;

    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/operator/cargo/available-for-placement")
                .header("authorization", "Bearer operator_token");
            then.status(200).json_body(json!({
                "items": [
                    {"id": "c1", "cargo_number": "250101"},
                    {"id": "c2", "cargo_number": "250102"},
                    {"id": "c3", "cargo_number": "250103"}
                ],
                "pagination": {"total": 3}
            }));
        })
        .await;

    let single_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/c1/remove-from-placement");
            then.status(200).json_body(json!({
                "success": true,
                "cargo_number": "250101"
            }));
        })
        .await;

    let bulk_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/bulk-remove-from-placement")
                .json_body(json!({"cargo_ids": ["c2", "c3"]}));
            then.status(200).json_body(json!({
                "success": true,
                "deleted_count": 2,
                "total_requested": 2
            }));
        })
        .await;

    let mut context = ScenarioContext::new(operator_config(&server));
    let mut checks = CheckRecorder::new();
    checks.begin_scenario("removal");

    RemovalScenario.run(&mut context, &mut checks).await?;
    let results = checks.into_results();

    assert_eq!(status_of(&results, "remove single cargo"), CheckStatus::Pass);
    assert_eq!(status_of(&results, "single removal reports success"), CheckStatus::Pass);
    assert_eq!(status_of(&results, "bulk remove cargo"), CheckStatus::Pass);
    assert_eq!(
        status_of(&results, "bulk removal deleted every requested cargo"),
        CheckStatus::Pass
    );

    // mock 清單不會變動，所以三筆都應被標示為仍在清單中
    let leftover = results
        .iter()
        .find(|r| r.name == "removed cargo left the placement list")
        .unwrap();
    assert_eq!(leftover.status, CheckStatus::Fail);
    assert_eq!(leftover.details, "still listed: c1, c2, c3");

    assert_eq!(
        context.get_shared_data(REMOVED_CARGO_KEY),
        Some(&json!(["c1", "c2", "c3"]))
    );

    list_mock.assert_hits_async(2).await;
    single_mock.assert_async().await;
    bulk_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn bulk_removal_count_mismatch_is_a_failure() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_operator_login(&server).await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/operator/cargo/available-for-placement");
            then.status(200).json_body(json!([
                {"id": "c1", "cargo_number": "250101"},
                {"id": "c2", "cargo_number": "250102"},
                {"id": "c3", "cargo_number": "250103"}
            ]));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/c1/remove-from-placement");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    // 後端只解析到一筆：deleted_count 與 total_requested 不一致
    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/bulk-remove-from-placement");
            then.status(200).json_body(json!({
                "success": true,
                "deleted_count": 1,
                "total_requested": 2
            }));
        })
        .await;

    let mut context = ScenarioContext::new(operator_config(&server));
    let mut checks = CheckRecorder::new();
    checks.begin_scenario("removal");

    RemovalScenario.run(&mut context, &mut checks).await?;
    let results = checks.into_results();

    assert_eq!(status_of(&results, "bulk remove cargo"), CheckStatus::Pass);
    assert_eq!(
        status_of(&results, "bulk removal deleted every requested cargo"),
        CheckStatus::Fail
    );
    Ok(())
}

#[tokio::test]
async fn empty_placement_list_skips_removal() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_operator_login(&server).await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/operator/cargo/available-for-placement");
            then.status(200).json_body(json!({"items": []}));
        })
        .await;

    let delete_mock = server
        .mock_async(|when, then| {
            when.method(DELETE);
            then.status(200);
        })
        .await;

    let mut context = ScenarioContext::new(operator_config(&server));
    let mut checks = CheckRecorder::new();
    checks.begin_scenario("removal");

    RemovalScenario.run(&mut context, &mut checks).await?;
    let results = checks.into_results();

    assert_eq!(status_of(&results, "remove from placement"), CheckStatus::Skip);
    assert_eq!(delete_mock.hits_async().await, 0);
    Ok(())
}

/// 數量一致但 success=false，仍應判定為失敗
#[tokio::test]
async fn bulk_removal_reporting_failure_is_a_failure() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_operator_login(&server).await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/operator/cargo/available-for-placement");
            then.status(200).json_body(json!([
                {"id": "c1", "cargo_number": "250101"},
                {"id": "c2", "cargo_number": "250102"},
                {"id": "c3", "cargo_number": "250103"}
            ]));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/c1/remove-from-placement");
            then.status(200).json_body(json!({"success": true}));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/bulk-remove-from-placement");
            then.status(200).json_body(json!({
                "success": false,
                "deleted_count": 2,
                "total_requested": 2
            }));
        })
        .await;

    let mut context = ScenarioContext::new(operator_config(&server));
    let mut checks = CheckRecorder::new();
    checks.begin_scenario("removal");

    RemovalScenario.run(&mut context, &mut checks).await?;
    let results = checks.into_results();

    assert_eq!(status_of(&results, "bulk remove cargo"), CheckStatus::Pass);
    assert_eq!(status_of(&results, "bulk removal reports success"), CheckStatus::Fail);
    assert_eq!(
        status_of(&results, "bulk removal deleted every requested cargo"),
        CheckStatus::Pass
    );
    Ok(())
}

/// 單筆移除連線逾時：記錄失敗後仍繼續批次移除
#[tokio::test]
async fn single_removal_timeout_does_not_stop_bulk_removal() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_operator_login(&server).await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/operator/cargo/available-for-placement");
            then.status(200).json_body(json!([
                {"id": "c1", "cargo_number": "250101"},
                {"id": "c2", "cargo_number": "250102"}
            ]));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/c1/remove-from-placement");
            then.status(200)
                .delay(std::time::Duration::from_secs(3))
                .json_body(json!({"success": true}));
        })
        .await;

    let bulk_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/operator/cargo/bulk-remove-from-placement")
                .json_body(json!({"cargo_ids": ["c2"]}));
            then.status(200).json_body(json!({
                "success": true,
                "deleted_count": 1,
                "total_requested": 1
            }));
        })
        .await;

    let mut config = operator_config(&server);
    config.target.timeout_seconds = 1;
    let mut context = ScenarioContext::new(config);
    let mut checks = CheckRecorder::new();
    checks.begin_scenario("removal");

    RemovalScenario.run(&mut context, &mut checks).await?;
    let results = checks.into_results();

    assert_eq!(status_of(&results, "remove single cargo"), CheckStatus::Fail);
    assert_eq!(status_of(&results, "bulk remove cargo"), CheckStatus::Pass);
    assert_eq!(status_of(&results, "bulk removal reports success"), CheckStatus::Pass);
    assert_eq!(context.get_shared_data(REMOVED_CARGO_KEY), Some(&json!(["c2"])));

    bulk_mock.assert_async().await;
    Ok(())
}
