use crate::error::{PipelineError, Result};
use crate::models::{NormalizedCohort, RegressionResult};
use crate::stats::student_t_two_sided;

pub const MIN_OBSERVATIONS: usize = 3;

/// Ordinary least squares of outcome per 100k on tests per 100k.
pub fn fit(cohort: &NormalizedCohort) -> Result<RegressionResult> {
    let points: Vec<(f64, f64)> = cohort
        .rows
        .iter()
        .map(|row| (row.tests_per_100k, row.outcome_per_100k))
        .collect();
    fit_points(&points)
}

pub fn fit_points(points: &[(f64, f64)]) -> Result<RegressionResult> {
    let n = points.len();
    if n < MIN_OBSERVATIONS {
        return Err(PipelineError::InsufficientData(format!(
            "{n} rows, need at least {MIN_OBSERVATIONS}"
        )));
    }

    let n_f = n as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n_f;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n_f;

    let (mut sxx, mut sxy, mut syy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if !sxx.is_finite() {
        return Err(PipelineError::InsufficientData(
            "rates contain non-finite values".to_string(),
        ));
    }
    if sxx <= 0.0 {
        return Err(PipelineError::InsufficientData(
            "tests per 100k is constant across rows".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let sse: f64 = points
        .iter()
        .map(|(x, y)| {
            let residual = y - (intercept + slope * x);
            residual * residual
        })
        .sum();

    let degrees_of_freedom = n - 2;
    let r_squared = if syy > 0.0 {
        (1.0 - sse / syy).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let slope_std_error = (sse / degrees_of_freedom as f64 / sxx).sqrt();
    if ![slope, intercept, sse, slope_std_error]
        .iter()
        .all(|value| value.is_finite())
    {
        return Err(PipelineError::InsufficientData(
            "rates contain non-finite values".to_string(),
        ));
    }

    let (t_statistic, p_value) = if slope_std_error > 0.0 {
        let t = slope / slope_std_error;
        (t, student_t_two_sided(t, degrees_of_freedom as f64))
    } else if slope == 0.0 {
        (0.0, 1.0)
    } else {
        (f64::INFINITY.copysign(slope), 0.0)
    };

    Ok(RegressionResult {
        slope,
        intercept,
        p_value,
        r_squared,
        n,
        degrees_of_freedom,
        slope_std_error,
        t_statistic,
    })
}
