use chrono::NaiveDate;
use serde::Serialize;

/// One row of the source table after projection: a country on a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawObservation {
    pub country: String,
    pub date: NaiveDate,
    /// Cumulative tests. `None` when the cell was empty.
    pub total_tests: Option<f64>,
    pub weekly_hosp_admissions: Option<f64>,
    /// Cumulative deaths. `None` when the cell was empty.
    pub total_deaths: Option<f64>,
    /// `None` when the cell was empty; the population gate decides what that means.
    pub population: Option<f64>,
}

/// Per-country roll-up of the observation time series.
///
/// `tests_total` and `deaths_total` are `None` when the country never
/// reported a value, which is distinct from reporting zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub earliest_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub population_estimate: Option<f64>,
    pub tests_total: Option<f64>,
    pub deaths_total: Option<f64>,
    pub hospitalizations_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hospitalizations,
    Deaths,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Hospitalizations => "hospitalizations",
            Outcome::Deaths => "deaths",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortRow {
    pub country: String,
    pub population_estimate: f64,
    pub tests_total: f64,
    pub outcome_total: f64,
}

/// Countries retained for one outcome, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisCohort {
    pub outcome: Outcome,
    pub rows: Vec<CohortRow>,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRow {
    pub country: String,
    pub population_estimate: f64,
    pub tests_total: f64,
    pub outcome_total: f64,
    pub tests_per_100k: f64,
    pub outcome_per_100k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCohort {
    pub outcome: Outcome,
    pub rows: Vec<RateRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Two-sided p-value for the null hypothesis that the slope is zero.
    pub p_value: f64,
    pub r_squared: f64,
    pub n: usize,
    pub degrees_of_freedom: usize,
    pub slope_std_error: f64,
    pub t_statistic: f64,
}
