use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

/// What to do when a country's population is not constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationPolicy {
    /// Stop before any rate is computed.
    #[default]
    Abort,
    /// Continue with the earliest-date population and record a caveat.
    Proceed,
}

/// What to do with a country that reports zero hospitalizations and zero deaths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroOutcomePolicy {
    /// Log a warning and keep the row in the validated base.
    #[default]
    WarnAndKeep,
    /// Log a warning and reject the row.
    WarnAndDrop,
    /// Fail the pipeline.
    Fail,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub source: PathBuf,
    pub population_policy: PopulationPolicy,
    pub zero_outcome_policy: ZeroOutcomePolicy,
}

impl PipelineConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            population_policy: PopulationPolicy::default(),
            zero_outcome_policy: ZeroOutcomePolicy::default(),
        }
    }

    pub fn with_population_policy(mut self, policy: PopulationPolicy) -> Self {
        self.population_policy = policy;
        self
    }

    pub fn with_zero_outcome_policy(mut self, policy: ZeroOutcomePolicy) -> Self {
        self.zero_outcome_policy = policy;
        self
    }
}
