//! One-off diagnostic for the bulk remove-from-placement endpoint.
//!
//! Without `--remove` it only sends the sentinel probe for each payload shape. With `--remove`
//! it removes the given cargo ids using the chosen payload key and checks the counts.

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tajline_smoke::core::diagnostics::{probe_bulk_payload_shape, BULK_PAYLOAD_KEYS};
use tajline_smoke::core::inspect::deleted_count_matches;
use tajline_smoke::domain::endpoints;
use tajline_smoke::utils::logger;
use tajline_smoke::{Role, ScenarioContext, SuiteConfig};

#[derive(Parser, Debug)]
#[command(name = "bulk_remove_probe")]
#[command(about = "Diagnose the bulk remove-from-placement payload shape")]
struct Opts {
    /// Suite TOML with operator credentials; TAJLINE_* environment variables otherwise
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[arg(long)]
    base_url: Option<String>,

    /// Cargo ids to actually remove
    #[arg(long, value_delimiter = ',')]
    remove: Vec<String>,

    /// Payload key used with --remove
    #[arg(long, default_value = "cargo_ids")]
    key: String,

    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    logger::init_cli_logger(opts.verbose);

    anyhow::ensure!(
        BULK_PAYLOAD_KEYS.contains(&opts.key.as_str()),
        "--key must be one of {}",
        BULK_PAYLOAD_KEYS.join(", ")
    );

    let mut config = match &opts.config {
        Some(path) => SuiteConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SuiteConfig::from_env(),
    };
    if let Some(base_url) = &opts.base_url {
        config.target.base_url = base_url.clone();
    }
    config.validate_config()?;

    let mut context = ScenarioContext::new(config);
    let operator = context
        .session(Role::WarehouseOperator)
        .await
        .context("operator login")?
        .clone();

    println!("[1/2] payload shape probe");
    let probe = probe_bulk_payload_shape(&operator).await?;
    for key in &probe.accepted {
        println!("  {:<10} accepted", key);
    }
    for rejected in &probe.rejected {
        println!("  {:<10} rejected ({}): {}", rejected.key, rejected.status, rejected.reason);
    }

    if opts.remove.is_empty() {
        println!("[2/2] skipped: no --remove ids given");
        return Ok(());
    }

    println!("[2/2] bulk removal of {} cargo with '{}'", opts.remove.len(), opts.key);
    let mut body = Map::new();
    body.insert(opts.key.clone(), json!(opts.remove));
    let response = operator
        .delete_json(endpoints::CARGO_BULK_REMOVE_FROM_PLACEMENT, &Value::Object(body))
        .await?;
    println!("  status: {}", response.status);
    println!("  body: {}", response.excerpt(500));
    anyhow::ensure!(response.is_success(), "bulk removal failed");

    let deleted = deleted_count_matches(&response.body).map_err(anyhow::Error::msg)?;
    println!("  deleted_count == total_requested == {}", deleted);

    println!("OK");
    Ok(())
}
