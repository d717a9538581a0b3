//! Configuration module for Turnaround
//!
//! This module handles:
//! - Project-level configuration (turnaround.toml)
//! - Sweep range, outlier rule, and lookup mode overrides
//! - CLI defaults

mod project_config;

pub use project_config::{
    load_project_config, CliDefaults, ProjectConfig, CONFIG_FILE, SAMPLE_CONFIG,
};
