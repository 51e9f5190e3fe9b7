//! Configuration management for fuelbench
//!
//! Config stored at: ~/.config/fuelbench/config.json

use fuelbench_domain::service::AliasTable;
use fuelbench_infra::{default_exclusions, MasterOptions, DEFAULT_MASTER_EXCLUSIONS};
use fuelbench_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fuel price in rupiah per litre
    #[serde(default = "default_fuel_price")]
    pub fuel_price: f64,

    /// Preset used when none is given on the command line
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Overrides the preset's hour-meter delta ceiling
    #[serde(default)]
    pub delta_ceiling: Option<f64>,

    /// Fuel-log columns whose unit name starts with one of these are not equipment
    #[serde(default = "default_exclusions")]
    pub exclusion_keywords: Vec<String>,

    /// Master rows whose name contains one of these are dropped
    #[serde(default = "default_master_exclusions")]
    pub master_exclusions: Vec<String>,

    #[serde(default = "default_master_sheet")]
    pub master_sheet: String,

    /// Zero-based header row of the master sheet
    #[serde(default = "default_master_header_row")]
    pub master_header_row: usize,

    /// Header of the location column in the master sheet
    #[serde(default = "default_location_header")]
    pub location_header: String,

    /// Alias/typo/capacity-override table (TOML). The built-in seed table is used when unset.
    #[serde(default)]
    pub alias_table: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Keep parsed workbooks between presets of one run
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

fn default_fuel_price() -> f64 {
    6800.0
}

fn default_preset() -> String {
    "hm-power".to_string()
}

fn default_master_exclusions() -> Vec<String> {
    DEFAULT_MASTER_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_master_sheet() -> String {
    "Sheet2".to_string()
}

fn default_master_header_row() -> usize {
    1
}

fn default_location_header() -> String {
    "DES 2025".to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fuel_price: default_fuel_price(),
            preset: default_preset(),
            delta_ceiling: None,
            exclusion_keywords: default_exclusions(),
            master_exclusions: default_master_exclusions(),
            master_sheet: default_master_sheet(),
            master_header_row: default_master_header_row(),
            location_header: default_location_header(),
            alias_table: None,
            output_format: default_output_format(),
            cache_enabled: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("fuelbench");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Master workbook layout, with capacity overrides taken from the alias table
    pub fn master_options(&self, aliases: &AliasTable) -> MasterOptions {
        MasterOptions {
            sheet: self.master_sheet.clone(),
            header_row: self.master_header_row,
            location_header: self.location_header.clone(),
            exclusions: self.master_exclusions.clone(),
            capacity_overrides: aliases.capacity_overrides.clone(),
            brand_typos: aliases.brand_typos.clone(),
            ..MasterOptions::default()
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fuelbench Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Fuel price:       Rp {}/L", self.fuel_price)?;
        writeln!(f, "Preset:           {}", self.preset)?;
        writeln!(
            f,
            "Delta ceiling:    {}",
            self.delta_ceiling
                .map(|c| c.to_string())
                .unwrap_or_else(|| "(preset)".to_string())
        )?;
        writeln!(f, "Exclusions:       {}", self.exclusion_keywords.join(", "))?;
        writeln!(f, "Master excluded:  {}", self.master_exclusions.join(", "))?;
        writeln!(
            f,
            "Master sheet:     {} (header row {})",
            self.master_sheet, self.master_header_row
        )?;
        writeln!(f, "Location header:  {}", self.location_header)?;
        writeln!(
            f,
            "Alias table:      {}",
            self.alias_table
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        )?;
        writeln!(f, "Output format:    {}", self.output_format)?;
        writeln!(f, "Cache enabled:    {}", self.cache_enabled)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:      {}", path.display())?;
        }

        Ok(())
    }
}
