use std::collections::BTreeMap;

use crate::models::{CountrySummary, RawObservation};

/// Rolls each country's time series into one summary row, sorted by country.
///
/// Cumulative counters (`total_tests`, `total_deaths`) reduce with max and
/// yield `None` when every value is missing. Weekly hospital admissions are
/// additive and reduce with sum, yielding `0` when every value is missing.
pub fn summarize(observations: &[RawObservation]) -> Vec<CountrySummary> {
    let mut by_country: BTreeMap<&str, Vec<&RawObservation>> = BTreeMap::new();
    for observation in observations {
        by_country
            .entry(observation.country.as_str())
            .or_default()
            .push(observation);
    }

    by_country
        .into_iter()
        .filter_map(|(country, rows)| summarize_country(country, &rows))
        .collect()
}

fn summarize_country(country: &str, rows: &[&RawObservation]) -> Option<CountrySummary> {
    // Earliest date wins; ties go to the larger population so input order never matters.
    let population_key = |row: &RawObservation| row.population.unwrap_or(f64::NEG_INFINITY);
    let earliest = rows.iter().min_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(population_key(**b).total_cmp(&population_key(**a)))
    })?;
    let latest_date = rows.iter().map(|row| row.date).max()?;

    Some(CountrySummary {
        country: country.to_string(),
        earliest_date: earliest.date,
        latest_date,
        population_estimate: earliest.population,
        tests_total: max_present(rows.iter().map(|row| row.total_tests)),
        deaths_total: max_present(rows.iter().map(|row| row.total_deaths)),
        hospitalizations_total: sum_present(rows.iter().map(|row| row.weekly_hosp_admissions)),
    })
}

/// Max ignoring missing values; `None` when nothing is present.
pub fn max_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().reduce(f64::max)
}

/// Sum ignoring missing values; `0` when nothing is present.
pub fn sum_present<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().sum()
}
