//! CLI definition using clap

use clap::{Parser, Subcommand};
use fuelbench_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fuelbench")]
#[command(version)]
#[command(about = "Fuel efficiency benchmark for heavy equipment fleets")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Input files shared by analyze and trend
#[derive(clap::Args, Clone, Debug)]
pub struct InputArgs {
    /// Fuel log workbook with month sheets (JAN..DES)
    #[arg(long)]
    pub fuel: PathBuf,

    /// Equipment master workbook
    #[arg(long)]
    pub master: PathBuf,

    /// Second master workbook used to fill missing locations
    #[arg(long)]
    pub secondary_master: Option<PathBuf>,

    /// Tonnage / ton-km work log (xlsx or csv)
    #[arg(long)]
    pub work_log: Option<PathBuf>,

    /// Unit-to-KPI-group table (xlsx or csv)
    #[arg(long)]
    pub kpi_groups: Option<PathBuf>,

    /// Sheets to ingest instead of every month sheet (repeatable)
    #[arg(long = "sheet")]
    pub sheets: Vec<String>,

    /// Hour-meter delta ceiling. Overrides config and preset.
    #[arg(long)]
    pub ceiling: Option<f64>,

    /// Alias table (TOML). Overrides config.
    #[arg(long)]
    pub aliases: Option<PathBuf>,

    /// Disable the parse cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Benchmark the fleet with one or more presets
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Preset to run (repeatable). Uses config value if not specified.
        #[arg(long = "preset", short = 'p')]
        presets: Vec<String>,

        /// Fuel price in Rp/L. Uses config value if not specified.
        #[arg(long)]
        price: Option<f64>,

        /// Export results to this .xlsx file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Monthly fuel ratio of one unit
    Trend {
        #[command(flatten)]
        input: InputArgs,

        /// Unit name, as written in any source
        unit: String,

        /// Preset whose work basis is used. Uses config value if not specified.
        #[arg(long, short = 'p')]
        preset: Option<String>,
    },

    /// List available presets
    Presets,

    /// Show or modify configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set fuel price (Rp/L)
        #[arg(long)]
        set_price: Option<f64>,

        /// Set default preset
        #[arg(long)]
        set_preset: Option<String>,

        /// Set hour-meter delta ceiling
        #[arg(long)]
        set_ceiling: Option<f64>,

        /// Set alias table path
        #[arg(long)]
        set_aliases: Option<PathBuf>,

        /// Enable/disable cache
        #[arg(long)]
        set_cache: Option<bool>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
