use crate::config::suite_config::ReportConfig;
use crate::domain::model::SuiteReport;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SmokeError};
use serde_json::json;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const JSON_REPORT: &str = "report.json";
pub const CSV_REPORT: &str = "report.csv";
pub const DEFAULT_ARCHIVE: &str = "smoke_report.zip";

pub fn render_json(report: &SuiteReport) -> Result<String> {
    let document = json!({
        "suite": report.suite,
        "base_url": report.base_url,
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "summary": report.summary(),
        "success": report.is_success(),
        "results": report.results,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn render_csv(report: &SuiteReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["scenario", "check", "status", "duration_ms", "details"])?;

    for result in &report.results {
        let status = result.status.to_string();
        let duration = result.duration_ms.to_string();
        writer.write_record([
            result.scenario.as_str(),
            result.name.as_str(),
            status.as_str(),
            duration.as_str(),
            result.details.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| SmokeError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SmokeError::ConfigError {
        message: format!("CSV report is not UTF-8: {}", e),
    })
}

fn archive_name(config: &ReportConfig, report: &SuiteReport) -> String {
    match &config.filename_pattern {
        Some(pattern) => pattern
            .replace("{suite}", &report.suite)
            .replace(
                "{timestamp}",
                &report.started_at.format("%Y%m%d_%H%M%S").to_string(),
            ),
        None => DEFAULT_ARCHIVE.to_string(),
    }
}

/// Writes the configured report formats through `storage`. Returns the written file names.
pub async fn write_report<S: Storage>(
    storage: &S,
    config: &ReportConfig,
    report: &SuiteReport,
) -> Result<Vec<String>> {
    let mut rendered = Vec::new();
    for format in &config.formats {
        match format.as_str() {
            "json" => rendered.push((JSON_REPORT, render_json(report)?)),
            "csv" => rendered.push((CSV_REPORT, render_csv(report)?)),
            other => tracing::warn!("🔶 Unsupported report format: {}", other),
        }
    }

    if !config.compress {
        let mut written = Vec::new();
        for (name, content) in rendered {
            storage.write_file(name, content.as_bytes()).await?;
            written.push(name.to_string());
        }
        tracing::info!("💾 Report written: {}", written.join(", "));
        return Ok(written);
    }

    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for (name, content) in &rendered {
            zip.start_file(*name, SimpleFileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }

        zip.start_file("metadata.json", SimpleFileOptions::default())?;
        let metadata = json!({
            "suite": report.suite,
            "base_url": report.base_url,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "files": rendered.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
        });
        zip.write_all(serde_json::to_string_pretty(&metadata)?.as_bytes())?;

        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    let name = archive_name(config, report);
    tracing::debug!("Writing report archive ({} bytes)", zip_data.len());
    storage.write_file(&name, &zip_data).await?;
    tracing::info!("💾 Report archive written: {}", name);
    Ok(vec![name])
}

/// Human summary on stdout, mirroring the per-check log lines.
pub fn print_summary(report: &SuiteReport) {
    let summary = report.summary();

    println!();
    println!("📊 {} against {}", report.suite, report.base_url);
    println!(
        "   {} checks: {} passed, {} failed, {} skipped ({:.1}% success)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.success_rate()
    );

    if report.is_success() {
        println!("✅ All executed checks passed");
    } else {
        println!("❌ Failed checks:");
        for failure in report.failures() {
            println!("   - [{}] {}: {}", failure.scenario, failure.name, failure.details);
        }
    }
}
