//! Exclusion rules and the two analysis cohorts.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::config::ZeroOutcomePolicy;
use crate::error::{PipelineError, Result, ZeroOutcomeAnomaly};
use crate::models::{AnalysisCohort, CohortRow, CountrySummary, Outcome};

/// Aggregate rows in the source that are not a single country or territory.
pub const AGGREGATE_REGIONS: [&str; 13] = [
    "Africa",
    "Asia",
    "Europe",
    "European Union",
    "North America",
    "Oceania",
    "South America",
    "World",
    "International",
    "High income",
    "Upper middle income",
    "Lower middle income",
    "Low income",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    AggregateRegion,
    NoTestingData,
    ZeroOutcomes,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::AggregateRegion => write!(f, "continent or aggregate region"),
            RejectionReason::NoTestingData => write!(f, "no testing data"),
            RejectionReason::ZeroOutcomes => write!(f, "zero hospitalizations and deaths"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSelection {
    pub valid: Vec<CountrySummary>,
    pub rejected: BTreeMap<String, RejectionReason>,
    pub anomalies: Vec<ZeroOutcomeAnomaly>,
    pub hospitalizations: AnalysisCohort,
    pub deaths: AnalysisCohort,
}

pub fn is_aggregate_region(country: &str) -> bool {
    AGGREGATE_REGIONS.contains(&country)
}

pub fn filter(
    summaries: &[CountrySummary],
    policy: ZeroOutcomePolicy,
) -> Result<CohortSelection> {
    let mut rejected = BTreeMap::new();
    let mut valid = Vec::with_capacity(summaries.len());

    for summary in summaries {
        if is_aggregate_region(&summary.country) {
            rejected.insert(summary.country.clone(), RejectionReason::AggregateRegion);
        } else if summary.tests_total.is_none() {
            rejected.insert(summary.country.clone(), RejectionReason::NoTestingData);
        } else {
            valid.push(summary.clone());
        }
    }

    let unpopulated: Vec<String> = valid
        .iter()
        .filter(|summary| summary.population_estimate.is_none())
        .map(|summary| summary.country.clone())
        .collect();
    if !unpopulated.is_empty() {
        return Err(PipelineError::MissingPopulation(unpopulated));
    }

    let anomalies = zero_outcome_anomalies(&valid);
    if !anomalies.is_empty() {
        match policy {
            ZeroOutcomePolicy::Fail => return Err(PipelineError::ZeroOutcome(anomalies)),
            ZeroOutcomePolicy::WarnAndKeep => {
                for anomaly in &anomalies {
                    warn!(
                        country = %anomaly.country,
                        "country reports zero hospitalizations and deaths; keeping"
                    );
                }
            }
            ZeroOutcomePolicy::WarnAndDrop => {
                for anomaly in &anomalies {
                    warn!(
                        country = %anomaly.country,
                        "country reports zero hospitalizations and deaths; dropping"
                    );
                    rejected.insert(anomaly.country.clone(), RejectionReason::ZeroOutcomes);
                }
                valid.retain(|summary| !anomalies.iter().any(|a| a.country == summary.country));
            }
        }
    }

    let hospitalizations = cohort(&valid, Outcome::Hospitalizations);
    let deaths = cohort(&valid, Outcome::Deaths);

    Ok(CohortSelection {
        valid,
        rejected,
        anomalies,
        hospitalizations,
        deaths,
    })
}

/// Rows reporting zero hospitalizations and zero deaths. Missing death data is not zero.
pub fn zero_outcome_anomalies(summaries: &[CountrySummary]) -> Vec<ZeroOutcomeAnomaly> {
    summaries
        .iter()
        .filter(|summary| {
            summary.hospitalizations_total == 0.0 && summary.deaths_total == Some(0.0)
        })
        .map(|summary| ZeroOutcomeAnomaly {
            country: summary.country.clone(),
            hospitalizations_total: summary.hospitalizations_total,
            deaths_total: 0.0,
        })
        .collect()
}

/// Projects the validated base onto one outcome, dropping zero or absent totals.
pub fn cohort(valid: &[CountrySummary], outcome: Outcome) -> AnalysisCohort {
    let mut rows = Vec::new();
    let mut excluded = Vec::new();

    for summary in valid {
        let outcome_total = match outcome {
            Outcome::Hospitalizations => Some(summary.hospitalizations_total),
            Outcome::Deaths => summary.deaths_total,
        };
        match (summary.population_estimate, summary.tests_total, outcome_total) {
            (Some(population_estimate), Some(tests_total), Some(outcome_total))
                if outcome_total != 0.0 =>
            {
                rows.push(CohortRow {
                    country: summary.country.clone(),
                    population_estimate,
                    tests_total,
                    outcome_total,
                })
            }
            _ => excluded.push(summary.country.clone()),
        }
    }

    AnalysisCohort {
        outcome,
        rows,
        excluded,
    }
}
