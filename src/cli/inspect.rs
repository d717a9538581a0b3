//! Inspect command implementation
//!
//! Evaluates every retained event at one chosen threshold and shows the
//! matching aggregate row plus the per-classification status breakdown.

use crate::config::{load_project_config, ProjectConfig};
use crate::engine::{self, LookupMode, Snapshot};
use crate::loader;
use crate::reporters;

use anyhow::Result;
use std::path::Path;

pub fn run(
    data: &Path,
    config: Option<&Path>,
    threshold: f64,
    nearest: bool,
    format: Option<&str>,
) -> Result<()> {
    let project = match config {
        Some(path) => ProjectConfig::from_path(path)?,
        None => load_project_config(Path::new(".")),
    };
    let config = project.analysis();
    let mode = if nearest {
        LookupMode::Nearest
    } else {
        config.lookup
    };

    let records = loader::load_records_file(data)?;
    let snapshot = Snapshot::build(&records, &config.outliers);
    let rows = engine::sweep::run(&snapshot.events, &config.sweep)?;
    let report = engine::inspect(&snapshot, &rows, threshold, mode)?;

    let format = format.unwrap_or("text");
    println!("{}", reporters::inspect(&report, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "\
rental_id,car_id,checkin_type,state,delay_at_checkout_in_minutes,previous_ended_rental_id,time_delta_with_previous_rental_in_minutes
1,7,mobile,ended,20,,
2,7,mobile,ended,5,1,15
3,8,connect,ended,-2,2,60
";

    #[test]
    fn test_inspect_swept_threshold_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("delays.csv");
        std::fs::write(&data, DATA).unwrap();
        run(&data, None, 25.0, false, Some("json")).unwrap();
    }

    #[test]
    fn test_inspect_off_grid_threshold_fails_exact() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("delays.csv");
        std::fs::write(&data, DATA).unwrap();
        let err = run(&data, None, 26.0, false, None).unwrap_err();
        assert!(err.to_string().contains("not in the swept table"));
    }

    #[test]
    fn test_inspect_off_grid_threshold_snaps_with_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("delays.csv");
        std::fs::write(&data, DATA).unwrap();
        run(&data, None, 26.0, true, None).unwrap();
    }
}
