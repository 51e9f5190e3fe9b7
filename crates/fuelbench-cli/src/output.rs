//! Output formatting module

use std::time::Duration;

use fuelbench_app::app::AnalysisReport;
use fuelbench_app::presets::PRESETS;
use fuelbench_domain::service::UnitTrend;
use fuelbench_types::{OutputFormat, Result, WorkBasis};
use indicatif::{ProgressBar, ProgressStyle};

/// Stderr spinner shown while a preset runs
pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

pub fn output_reports(output_format: OutputFormat, reports: &[AnalysisReport]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = match reports {
            [single] => serde_json::to_string_pretty(single)?,
            many => serde_json::to_string_pretty(many)?,
        };
        println!("{}", content);
    } else {
        for report in reports {
            println!("{}", report.render_text());
        }
    }
    Ok(())
}

pub fn output_trend(output_format: OutputFormat, trend: &UnitTrend, basis: WorkBasis) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(trend)?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nTren Bulanan / Monthly Trend: {}", trend.unit);
    println!("{}", "=".repeat(60));
    println!(
        "{:<18} {:>12} {:>12} {:>14}",
        "Bulan",
        "Liter",
        "Kerja",
        basis.ratio_unit()
    );
    println!("{}", "-".repeat(60));
    for point in &trend.points {
        println!(
            "{:<18} {:>12.1} {:>12.1} {:>14.2}",
            point.period.long_label(),
            point.fuel,
            point.work,
            point.ratio
        );
    }
    println!("{}", "-".repeat(60));
    Ok(())
}

pub fn output_presets(output_format: OutputFormat) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(&PRESETS)?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nPresets");
    println!("=======");
    println!(
        "{:<12} {:<13} {:<18} {:>8}  {}",
        "Name", "Basis", "Grouping", "Ceiling", "Description"
    );
    println!("{}", "-".repeat(90));
    for preset in &PRESETS {
        let ceiling = if preset.basis == WorkBasis::HourMeter {
            format!("{:.0}", preset.ceiling)
        } else {
            "-".to_string()
        };
        println!(
            "{:<12} {:<13} {:<18} {:>8}  {}",
            preset.name,
            preset.basis.to_string(),
            preset.grouping.to_string(),
            ceiling,
            preset.description
        );
    }
    Ok(())
}
