//! Chains the stages from the raw table to the two regression fits.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cohort::{self, CohortSelection};
use crate::config::{PipelineConfig, PopulationPolicy, ZeroOutcomePolicy};
use crate::error::{InconsistentPopulation, Result};
use crate::models::{
    AnalysisCohort, CountrySummary, NormalizedCohort, Outcome, RawObservation, RegressionResult,
};
use crate::{normalize, project, regression, store, summarize, validate};

/// Result of normalizing and fitting one cohort. A failure here never
/// affects the other cohort.
#[derive(Debug, Clone, Serialize)]
pub struct CohortOutcome {
    pub outcome: Outcome,
    pub excluded: Vec<String>,
    pub normalized: Option<NormalizedCohort>,
    pub regression: std::result::Result<RegressionResult, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub observation_count: usize,
    pub population_caveats: Vec<InconsistentPopulation>,
    pub summaries: Vec<CountrySummary>,
    pub selection: CohortSelection,
    pub hospitalizations: CohortOutcome,
    pub deaths: CohortOutcome,
}

pub fn load_observations(config: &PipelineConfig) -> Result<Vec<RawObservation>> {
    let table = store::load(&config.source)?;
    let observations = project::project(&table)?;
    info!(
        source = %config.source.display(),
        observations = observations.len(),
        "loaded observations"
    );
    Ok(observations)
}

pub fn run(config: &PipelineConfig) -> Result<AnalysisReport> {
    let observations = load_observations(config)?;
    analyze(
        &observations,
        config.population_policy,
        config.zero_outcome_policy,
    )
}

pub fn analyze(
    observations: &[RawObservation],
    population_policy: PopulationPolicy,
    zero_outcome_policy: ZeroOutcomePolicy,
) -> Result<AnalysisReport> {
    let population_caveats = match population_policy {
        PopulationPolicy::Abort => {
            validate::validate(observations)?;
            Vec::new()
        }
        PopulationPolicy::Proceed => {
            let offenders = validate::inconsistent_populations(observations);
            for offender in &offenders {
                warn!(
                    country = %offender.country,
                    distinct = offender.distinct_values.len(),
                    "population is not constant; using the earliest recorded value"
                );
            }
            offenders
        }
    };

    let summaries = summarize::summarize(observations);
    info!(countries = summaries.len(), "summarized countries");

    let selection = cohort::filter(&summaries, zero_outcome_policy)?;
    info!(
        valid = selection.valid.len(),
        rejected = selection.rejected.len(),
        anomalies = selection.anomalies.len(),
        hospitalization_rows = selection.hospitalizations.rows.len(),
        death_rows = selection.deaths.rows.len(),
        "filtered cohorts"
    );

    let hospitalizations = fit_cohort(&selection.hospitalizations);
    let deaths = fit_cohort(&selection.deaths);

    Ok(AnalysisReport {
        run_id: Uuid::new_v4(),
        observation_count: observations.len(),
        population_caveats,
        summaries,
        selection,
        hospitalizations,
        deaths,
    })
}

pub fn fit_cohort(cohort: &AnalysisCohort) -> CohortOutcome {
    let label = cohort.outcome.label();
    let normalized = match normalize::normalize(cohort) {
        Ok(normalized) => normalized,
        Err(err) => {
            warn!(cohort = label, error = %err, "normalization failed");
            return CohortOutcome {
                outcome: cohort.outcome,
                excluded: cohort.excluded.clone(),
                normalized: None,
                regression: Err(err.to_string()),
            };
        }
    };

    let regression = regression::fit(&normalized).map_err(|err| {
        warn!(cohort = label, error = %err, "regression fit failed");
        err.to_string()
    });
    if let Ok(result) = &regression {
        info!(
            cohort = label,
            n = result.n,
            slope = result.slope,
            p_value = result.p_value,
            r_squared = result.r_squared,
            "fitted regression"
        );
    }

    CohortOutcome {
        outcome: cohort.outcome,
        excluded: cohort.excluded.clone(),
        normalized: Some(normalized),
        regression,
    }
}
