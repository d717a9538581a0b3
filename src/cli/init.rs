//! Init command: write a sample turnaround.toml

use crate::config::{CONFIG_FILE, SAMPLE_CONFIG};
use anyhow::{bail, Result};
use console::style;
use std::path::Path;

pub fn run() -> Result<()> {
    run_in(Path::new("."))
}

fn run_in(dir: &Path) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        bail!("'{}' already exists; not overwriting it", path.display());
    }
    std::fs::write(&path, SAMPLE_CONFIG)?;
    println!(
        "{} wrote {} — edit it to tune the sweep and outlier rule",
        style("✔").green(),
        path.display()
    );
    Ok(())
}
