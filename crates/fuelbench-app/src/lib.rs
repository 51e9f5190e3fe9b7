//! Application service layer - pipeline, config, presets, export

pub mod app;
pub mod config;
pub mod export;
pub mod presets;
