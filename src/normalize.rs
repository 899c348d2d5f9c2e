use crate::error::{PipelineError, Result};
use crate::models::{AnalysisCohort, NormalizedCohort, RateRow};

pub const PER_POPULATION: f64 = 100_000.0;

pub fn per_100k(total: f64, population: f64) -> f64 {
    total / population * PER_POPULATION
}

pub fn normalize(cohort: &AnalysisCohort) -> Result<NormalizedCohort> {
    let rows = cohort
        .rows
        .iter()
        .map(|row| {
            if !row.population_estimate.is_finite() || row.population_estimate <= 0.0 {
                return Err(PipelineError::InvalidPopulation {
                    country: row.country.clone(),
                    population: row.population_estimate,
                });
            }
            Ok(RateRow {
                country: row.country.clone(),
                population_estimate: row.population_estimate,
                tests_total: row.tests_total,
                outcome_total: row.outcome_total,
                tests_per_100k: per_100k(row.tests_total, row.population_estimate),
                outcome_per_100k: per_100k(row.outcome_total, row.population_estimate),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NormalizedCohort {
        outcome: cohort.outcome,
        rows,
    })
}
