use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A country whose records carry more than one population value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InconsistentPopulation {
    pub country: String,
    /// Distinct values in first-seen order. A blank cell counts as its own value.
    pub distinct_values: Vec<Option<f64>>,
}

impl fmt::Display for InconsistentPopulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self
            .distinct_values
            .iter()
            .map(|value| match value {
                Some(value) => format!("{value}"),
                None => "missing".to_string(),
            })
            .collect();
        write!(f, "{} [{}]", self.country, values.join(", "))
    }
}

/// A country that reports neither hospitalizations nor deaths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroOutcomeAnomaly {
    pub country: String,
    pub hospitalizations_total: f64,
    pub deaths_total: f64,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data source error: {0}")]
    DataSource(String),

    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("population is not constant for {} countries: {}", .0.len(), join_display(.0))]
    InconsistentPopulation(Vec<InconsistentPopulation>),

    #[error("zero hospitalizations and deaths for {} countries: {}", .0.len(), join_countries(.0))]
    ZeroOutcome(Vec<ZeroOutcomeAnomaly>),

    #[error("no population recorded for {}", .0.join(", "))]
    MissingPopulation(Vec<String>),

    #[error("invalid population {population} for {country}")]
    InvalidPopulation { country: String, population: f64 },

    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::DataSource(err.to_string())
    }
}

fn join_display(offenders: &[InconsistentPopulation]) -> String {
    offenders
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_countries(anomalies: &[ZeroOutcomeAnomaly]) -> String {
    anomalies
        .iter()
        .map(|anomaly| anomaly.country.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
