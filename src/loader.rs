//! CSV dataset loader
//!
//! Parses a rental-delay export into [`RentalRecord`]s. Expected columns:
//!   rental_id, car_id, checkin_type, state, delay_at_checkout_in_minutes,
//!   previous_ended_rental_id, time_delta_with_previous_rental_in_minutes
//!
//! Empty cells deserialize to `None`; an unreadable file or a malformed row
//! is fatal at this seam (the engine downstream never sees partial rows).

use crate::models::RentalRecord;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Load rental records from any CSV reader.
pub fn load_records<R: Read>(reader: R) -> Result<Vec<RentalRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        // +2: one for the header row, one for 1-based numbering
        let record: RentalRecord =
            result.with_context(|| format!("CSV parse error at line {}", line_num + 2))?;
        records.push(record);
    }

    Ok(records)
}

/// Load rental records from a CSV file path.
pub fn load_records_file(path: &Path) -> Result<Vec<RentalRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset '{}'", path.display()))?;
    let records = load_records(file)
        .with_context(|| format!("failed to parse dataset '{}'", path.display()))?;
    info!(records = records.len(), path = %path.display(), "dataset loaded");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckinType;

    const SAMPLE_CSV: &str = "\
rental_id,car_id,checkin_type,state,delay_at_checkout_in_minutes,previous_ended_rental_id,time_delta_with_previous_rental_in_minutes
1,100,mobile,ended,-5,,
2,100,connect,ended,20,1,15
3,101,mobile,ended,,2,40
4,101,paper,canceled,12,3,
";

    #[test]
    fn load_sample_csv() {
        let records = load_records(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].rental_id, 1);
        assert_eq!(records[0].checkin_type, CheckinType::Mobile);
        assert_eq!(records[0].delay_at_checkout_in_minutes, Some(-5.0));
        assert_eq!(records[0].previous_ended_rental_id, None);
        assert_eq!(records[1].previous_ended_rental_id, Some(1));
        assert_eq!(
            records[1].time_delta_with_previous_rental_in_minutes,
            Some(15.0)
        );
    }

    #[test]
    fn empty_cells_become_none() {
        let records = load_records(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(records[2].delay_at_checkout_in_minutes, None);
        assert_eq!(records[3].time_delta_with_previous_rental_in_minutes, None);
    }

    #[test]
    fn unknown_checkin_maps_to_other() {
        let records = load_records(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(records[3].checkin_type, CheckinType::Other);
    }

    #[test]
    fn malformed_row_is_an_error() {
        let bad = "\
rental_id,car_id,checkin_type,state,delay_at_checkout_in_minutes,previous_ended_rental_id,time_delta_with_previous_rental_in_minutes
not-a-number,100,mobile,ended,5,,
";
        let err = load_records(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn missing_file_has_context() {
        let err = load_records_file(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }
}
