//! Turnaround - rental safety-margin analysis
//!
//! A local-first CLI and library that classifies each rental against the
//! checkout delay of the previous rental of the same car, sweeps candidate
//! safety-margin thresholds, and aggregates how many conflicts each
//! threshold solves versus how many bookings it displaces.

pub mod cli;
pub mod config;
pub mod engine;
pub mod loader;
pub mod models;
pub mod reporters;
