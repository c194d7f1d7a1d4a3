use clap::Parser;
use tajline_smoke::app::scenarios::{build_scenario, SCENARIO_ORDER};
use tajline_smoke::core::report::{print_summary, write_report};
use tajline_smoke::domain::ports::Scenario;
use tajline_smoke::utils::logger;
use tajline_smoke::{build_suite, CliConfig, LocalStorage, ScenarioContext};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if cli.list_scenarios {
        for name in SCENARIO_ORDER {
            if let Some(scenario) = build_scenario(name) {
                let marker = if scenario.mutates() { " (mutating)" } else { "" };
                println!("{:<14} {}{}", name, scenario.description(), marker);
            }
        }
        return;
    }

    tracing::info!("Starting tajline-smoke");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_suite_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    let suite = match build_suite(&config) {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    if config.suite.allow_mutations {
        tracing::warn!(
            "⚠️ Mutations enabled: scenarios will place, remove and accept records on {}",
            config.target.base_url
        );
    }

    let report_config = config.report.clone();
    let mut context = ScenarioContext::new(config);
    let report = suite.run(&mut context).await;

    print_summary(&report);

    if report_config.enabled {
        let storage = LocalStorage::new(&report_config.output_path);
        match write_report(&storage, &report_config, &report).await {
            Ok(files) => println!("📁 Report saved to {}: {}", report_config.output_path, files.join(", ")),
            Err(e) => {
                tracing::error!("❌ Could not write report: {}", e);
                eprintln!("💡 {}", e.recovery_suggestion());
            }
        }
    }

    std::process::exit(report.exit_code());
}
