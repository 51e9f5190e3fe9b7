//! Command implementations

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{Cli, Commands, InputArgs};
use crate::output;
use fuelbench_app::app::{AnalysisRequest, AnalysisService};
use fuelbench_app::config::Config;
use fuelbench_app::export::export_to_excel;
use fuelbench_app::presets::find_preset;
use fuelbench_types::{Error, OutputFormat, Result};

pub fn execute(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Analyze {
            input,
            presets,
            price,
            output,
        } => cmd_analyze(config, &input, presets, price, output, output_format),

        Commands::Trend { input, unit, preset } => {
            cmd_trend(config, &input, &unit, preset, output_format)
        }

        Commands::Presets => output::output_presets(output_format),

        Commands::Config {
            show,
            set_price,
            set_preset,
            set_ceiling,
            set_aliases,
            set_cache,
            set_output,
            reset,
        } => cmd_config(
            show,
            set_price,
            set_preset,
            set_ceiling,
            set_aliases,
            set_cache,
            set_output,
            reset,
        ),
    }
}

/// Per-run config overrides from the input flags
fn apply_overrides(config: &mut Config, input: &InputArgs) {
    if let Some(ref aliases) = input.aliases {
        config.alias_table = Some(aliases.clone());
    }
    if input.no_cache {
        config.cache_enabled = false;
    }
}

fn build_request(input: &InputArgs) -> AnalysisRequest {
    let mut request = AnalysisRequest::new(&input.fuel, &input.master).with_sheets(input.sheets.clone());
    if let Some(ref path) = input.secondary_master {
        request = request.with_secondary_master(path.clone());
    }
    if let Some(ref path) = input.work_log {
        request = request.with_work_log(path.clone());
    }
    if let Some(ref path) = input.kpi_groups {
        request = request.with_kpi_groups(path.clone());
    }
    if let Some(ceiling) = input.ceiling {
        request = request.with_ceiling(ceiling);
    }
    request
}

fn cmd_analyze(
    mut config: Config,
    input: &InputArgs,
    presets: Vec<String>,
    price: Option<f64>,
    output: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    apply_overrides(&mut config, input);
    let presets = if presets.is_empty() {
        vec![config.preset.clone()]
    } else {
        presets
    };
    // Fail on a typo before any workbook is parsed
    for name in &presets {
        find_preset(name)?;
    }

    let mut service = AnalysisService::new(config)?;
    let mut base = build_request(input);
    if let Some(price) = price {
        base = base.with_fuel_price(price);
    }

    let mut reports = Vec::with_capacity(presets.len());
    for name in &presets {
        let pb = output::spinner(format!("Analyzing preset {}...", name));
        let result = service.analyze(&base.clone().with_preset(name.clone()));
        pb.finish_and_clear();
        reports.push(result?);
    }
    let stats = service.cache_stats();
    debug!(entries = stats.entries, hits = stats.hits, misses = stats.misses, "parse cache");

    output::output_reports(output_format, &reports)?;

    if let Some(path) = output {
        for report in &reports {
            let target = if reports.len() == 1 {
                path.clone()
            } else {
                per_preset_path(&path, report.preset.name)
            };
            export_to_excel(report, &target)?;
            eprintln!("Exported to: {}", target.display());
        }
    }

    Ok(())
}

/// `hasil.xlsx` + `hm-power` -> `hasil_hm-power.xlsx`
fn per_preset_path(path: &Path, preset: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("fuelbench");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("xlsx");
    path.with_file_name(format!("{}_{}.{}", stem, preset, ext))
}

fn cmd_trend(
    mut config: Config,
    input: &InputArgs,
    unit: &str,
    preset: Option<String>,
    output_format: OutputFormat,
) -> Result<()> {
    apply_overrides(&mut config, input);
    let preset_name = preset.unwrap_or_else(|| config.preset.clone());
    let basis = find_preset(&preset_name)?.basis;

    let mut service = AnalysisService::new(config)?;
    let request = build_request(input).with_preset(preset_name);

    let pb = output::spinner(format!("Building trend for {}...", unit));
    let result = service.trend(&request, unit);
    pb.finish_and_clear();

    match result? {
        Some(trend) => output::output_trend(output_format, &trend, basis),
        None => Err(Error::InvalidInput(format!(
            "unit '{}' has no reconciled data in the fuel log",
            unit
        ))),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    show: bool,
    set_price: Option<f64>,
    set_preset: Option<String>,
    set_ceiling: Option<f64>,
    set_aliases: Option<PathBuf>,
    set_cache: Option<bool>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(price) = set_price {
        if price < 0.0 {
            return Err(Error::InvalidInput("fuel price cannot be negative".to_string()));
        }
        config.fuel_price = price;
        modified = true;
    }

    if let Some(preset) = set_preset {
        config.preset = find_preset(&preset)?.name.to_string();
        modified = true;
    }

    if let Some(ceiling) = set_ceiling {
        if ceiling <= 0.0 {
            return Err(Error::InvalidInput("delta ceiling must be positive".to_string()));
        }
        config.delta_ceiling = Some(ceiling);
        modified = true;
    }

    if let Some(path) = set_aliases {
        config.alias_table = Some(path);
        modified = true;
    }

    if let Some(cache_enabled) = set_cache {
        config.cache_enabled = cache_enabled;
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
