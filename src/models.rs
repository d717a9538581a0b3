//! Core data models for Turnaround
//!
//! These models are used throughout the codebase for representing
//! rental records, classified events, and per-threshold evaluations.

use serde::{Deserialize, Serialize};

/// How the renter checked in for a rental.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum CheckinType {
    Mobile,
    Connect,
    /// Anything the dataset uses that we don't know about.
    #[default]
    Other,
}

impl CheckinType {
    /// Parse a raw dataset cell. Unknown labels map to `Other` so a new
    /// check-in channel never fails an entire load.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "mobile" => CheckinType::Mobile,
            "connect" => CheckinType::Connect,
            _ => CheckinType::Other,
        }
    }
}

impl std::fmt::Display for CheckinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckinType::Mobile => write!(f, "mobile"),
            CheckinType::Connect => write!(f, "connect"),
            CheckinType::Other => write!(f, "other"),
        }
    }
}

/// Deserialize a check-in cell leniently (see [`CheckinType::from_raw`]).
pub fn deserialize_checkin<'de, D>(deserializer: D) -> Result<CheckinType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(CheckinType::from_raw(&s))
}

/// One row of the source table, as loaded from CSV.
///
/// Minutes columns are nullable: the dataset leaves the delay empty when the
/// checkout time was never recorded, and the delta/previous-rental columns
/// empty for the first rental of a car.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalRecord {
    pub rental_id: u64,
    #[serde(default)]
    pub car_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_checkin")]
    pub checkin_type: CheckinType,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub delay_at_checkout_in_minutes: Option<f64>,
    #[serde(default)]
    pub previous_ended_rental_id: Option<u64>,
    #[serde(default)]
    pub time_delta_with_previous_rental_in_minutes: Option<f64>,
}

/// Threshold-invariant classification of an eligible event.
///
/// A negative previous delay means the car came back before its slot closed,
/// so no conflict is possible. Otherwise the planned gap either absorbed the
/// delay (`NonProblematic`) or did not (`Problematic`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    ReturnedEarly,
    Problematic,
    NonProblematic,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::ReturnedEarly => write!(f, "returned early"),
            Classification::Problematic => write!(f, "problematic"),
            Classification::NonProblematic => write!(f, "non-problematic"),
        }
    }
}

/// Outcome of applying a candidate threshold to one event.
///
/// `ReturnedEarly` events carry no status at all, which is why evaluations
/// hold an `Option<Status>` rather than a fifth "empty" variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Problematic, and the threshold absorbs the previous delay.
    Solved,
    /// Problematic, threshold too small to absorb the previous delay.
    Unsolved,
    /// Non-problematic, but the threshold pushes the booking start later
    /// than planned (positive losses).
    Affected,
    /// Non-problematic and the threshold fits inside the planned gap.
    NotAffected,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Solved => write!(f, "solved"),
            Status::Unsolved => write!(f, "unsolved"),
            Status::Affected => write!(f, "affected"),
            Status::NotAffected => write!(f, "not affected"),
        }
    }
}

/// An event that survived eligibility screening and outlier exclusion.
///
/// `delay_of_previous` is the checkout delay of the referenced previous
/// rental, resolved through the prebuilt delay index. `classification` is
/// fixed at snapshot build time and never changes during a sweep.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EligibleEvent {
    pub rental_id: u64,
    pub checkin_type: CheckinType,
    pub delay_of_previous: f64,
    pub delta: f64,
    pub classification: Classification,
}

/// One event evaluated under one candidate threshold.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EvaluatedEvent {
    #[serde(flatten)]
    pub event: EligibleEvent,
    pub threshold: f64,
    /// `threshold - delay_of_previous`; non-negative means the margin
    /// absorbs the previous delay.
    pub threshold_minus_delay: f64,
    /// `threshold - delta`; positive means the margin pushes the booking
    /// start later than planned, in minutes.
    pub losses: f64,
    pub status: Option<Status>,
}
