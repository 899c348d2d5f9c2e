//! Per-country COVID-19 testing, hospitalization and death rates.
//!
//! The pipeline loads a per-country, per-date CSV, checks that each
//! country's population is constant, rolls the series up into one row per
//! country, splits the result into a hospitalization cohort and a death
//! cohort, converts totals to rates per 100,000 people and regresses each
//! outcome rate on the testing rate.

pub mod cohort;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod regression;
pub mod report;
pub mod stats;
pub mod store;
pub mod summarize;
pub mod validate;

pub use config::{PipelineConfig, PopulationPolicy, ZeroOutcomePolicy};
pub use error::{PipelineError, Result};
pub use pipeline::{analyze, run, AnalysisReport, CohortOutcome};
