use std::collections::BTreeMap;

use crate::error::{InconsistentPopulation, PipelineError, Result};
use crate::models::RawObservation;

/// Distinct population values per country, in first-seen order.
///
/// A blank population is one more distinct value, so a country mixing blank
/// and recorded populations fails the gate while an all-blank one does not.
pub fn population_values(observations: &[RawObservation]) -> BTreeMap<&str, Vec<Option<f64>>> {
    let mut values: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();

    for observation in observations {
        let entry = values.entry(observation.country.as_str()).or_default();
        let population = observation.population;
        if !entry
            .iter()
            .any(|seen| seen.map(f64::to_bits) == population.map(f64::to_bits))
        {
            entry.push(population);
        }
    }

    values
}

/// Fails with every country whose population is not a single value.
pub fn validate(observations: &[RawObservation]) -> Result<()> {
    let offenders = inconsistent_populations(observations);
    if offenders.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::InconsistentPopulation(offenders))
    }
}

pub fn inconsistent_populations(observations: &[RawObservation]) -> Vec<InconsistentPopulation> {
    population_values(observations)
        .into_iter()
        .filter(|(_, values)| values.len() != 1)
        .map(|(country, distinct_values)| InconsistentPopulation {
            country: country.to_string(),
            distinct_values,
        })
        .collect()
}
