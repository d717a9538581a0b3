//! Pure classification and threshold evaluation
//!
//! Both functions are total over their input domain: missing values are
//! screened out upstream during snapshot construction, so there is nothing
//! to fail on here.

use crate::models::{Classification, EligibleEvent, EvaluatedEvent, Status};

/// Classify one event against the checkout delay of its previous rental.
///
/// Threshold-invariant: the result depends only on `delay_of_previous` and
/// `delta`, never on the candidate threshold being swept.
pub fn classify(delay_of_previous: f64, delta: f64) -> Classification {
    if delay_of_previous < 0.0 {
        // The car came back before its slot closed; no conflict possible.
        Classification::ReturnedEarly
    } else if delta - delay_of_previous >= 0.0 {
        Classification::NonProblematic
    } else {
        Classification::Problematic
    }
}

/// Evaluate one classified event under one candidate threshold.
///
/// Deterministic and idempotent: the same (event, threshold) pair always
/// yields the same status and losses.
pub fn evaluate(event: &EligibleEvent, threshold: f64) -> EvaluatedEvent {
    let threshold_minus_delay = threshold - event.delay_of_previous;
    let losses = threshold - event.delta;

    let status = match event.classification {
        Classification::Problematic => {
            if threshold_minus_delay >= 0.0 {
                Some(Status::Solved)
            } else {
                Some(Status::Unsolved)
            }
        }
        Classification::ReturnedEarly => None,
        Classification::NonProblematic => {
            if losses <= 0.0 {
                Some(Status::NotAffected)
            } else {
                Some(Status::Affected)
            }
        }
    };

    EvaluatedEvent {
        event: *event,
        threshold,
        threshold_minus_delay,
        losses,
        status,
    }
}
