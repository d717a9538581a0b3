//! Project-level configuration support
//!
//! Loads per-project configuration from a `turnaround.toml` file next to the
//! dataset or in the working directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # turnaround.toml
//!
//! [sweep]
//! start = 0.0
//! stop = 125.0
//! step = 5.0
//!
//! [outliers]
//! multiplier = 1.5
//! statistic = "median"   # or "p90", "p95", ...
//!
//! [lookup]
//! mode = "exact"          # or "nearest"
//!
//! [defaults]
//! format = "text"
//! ```

use crate::engine::{AnalysisConfig, LookupMode, OutlierConfig, SweepConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the config file searched for next to the data.
pub const CONFIG_FILE: &str = "turnaround.toml";

/// Commented sample written by `turnaround init`.
pub const SAMPLE_CONFIG: &str = r#"# turnaround.toml — safety-margin analysis settings

[sweep]
# Candidate thresholds: start, start+step, ... up to but excluding stop.
start = 0.0
stop = 125.0
step = 5.0

[outliers]
# Events whose previous delay reaches multiplier x statistic (over eligible
# events with positive previous delay) are dropped from the analysis.
multiplier = 1.5
statistic = "median"   # or a percentile: "p90", "p95", ...

[lookup]
# How `turnaround inspect` treats a threshold outside the swept set:
# "exact" fails, "nearest" snaps to the closest candidate.
mode = "exact"

[defaults]
# Default output format for `turnaround analyze`.
format = "text"
"#;

/// Default CLI behavior configurable per project.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliDefaults {
    pub format: String,
}

impl Default for CliDefaults {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LookupSection {
    mode: LookupMode,
}

/// Everything `turnaround.toml` can set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub sweep: SweepConfig,
    pub outliers: OutlierConfig,
    lookup: LookupSection,
    pub defaults: CliDefaults,
}

impl ProjectConfig {
    /// Parse a config file, failing loudly (for explicit `--config` paths).
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config '{}'", path.display()))
    }

    pub fn lookup_mode(&self) -> LookupMode {
        self.lookup.mode
    }

    /// Collapse into the engine's configuration.
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            sweep: self.sweep,
            outliers: self.outliers,
            lookup: self.lookup.mode,
        }
    }
}

/// Load `turnaround.toml` from `dir`, leniently.
///
/// A missing file yields defaults; a malformed file warns and yields
/// defaults rather than failing the run.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "no project config, using defaults");
        return ProjectConfig::default();
    }
    match ProjectConfig::from_path(&path) {
        Ok(config) => {
            debug!(path = %path.display(), "loaded project config");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring malformed project config");
            ProjectConfig::default()
        }
    }
}
