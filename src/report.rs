use std::fmt::Write;

use crate::models::CountrySummary;
use crate::pipeline::{AnalysisReport, CohortOutcome};

fn format_total(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.0}"),
        None => "no data".to_string(),
    }
}

pub fn summary_line(summary: &CountrySummary) -> String {
    format!(
        "- {} ({} to {}) population {}, tests {}, hospitalizations {:.0}, deaths {}",
        summary.country,
        summary.earliest_date,
        summary.latest_date,
        format_total(summary.population_estimate),
        format_total(summary.tests_total),
        summary.hospitalizations_total,
        format_total(summary.deaths_total)
    )
}

pub fn regression_line(outcome: &CohortOutcome) -> String {
    match &outcome.regression {
        Ok(result) => format!(
            "{} per 100k ~ tests per 100k: slope {:.6}, intercept {:.4}, p-value {:.4}, R² {:.4} (n = {})",
            outcome.outcome.label(),
            result.slope,
            result.intercept,
            result.p_value,
            result.r_squared,
            result.n
        ),
        Err(message) => format!("{} per 100k: not fitted ({message})", outcome.outcome.label()),
    }
}

pub fn build_report(report: &AnalysisReport, source: &str) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# COVID-19 Testing vs Outcomes");
    let _ = writeln!(
        output,
        "Generated from {} ({} observations, run {})",
        source, report.observation_count, report.run_id
    );

    if !report.population_caveats.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Population Caveats");
        for caveat in &report.population_caveats {
            let _ = writeln!(output, "- {caveat}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Regression Results");
    for outcome in [&report.hospitalizations, &report.deaths] {
        let _ = writeln!(output, "- {}", regression_line(outcome));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Cohorts");
    for outcome in [&report.hospitalizations, &report.deaths] {
        let rows = outcome
            .normalized
            .as_ref()
            .map(|cohort| cohort.rows.len())
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "- {}: {} countries, {} excluded for zero or missing totals",
            outcome.outcome.label(),
            rows,
            outcome.excluded.len()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Zero Outcome Anomalies");
    if report.selection.anomalies.is_empty() {
        let _ = writeln!(output, "No country reports zero hospitalizations and deaths.");
    } else {
        for anomaly in &report.selection.anomalies {
            let _ = writeln!(
                output,
                "- {}: hospitalizations {:.0}, deaths {:.0}",
                anomaly.country,
                anomaly.hospitalizations_total,
                anomaly.deaths_total
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Rejected Rows");
    if report.selection.rejected.is_empty() {
        let _ = writeln!(output, "No rows rejected.");
    } else {
        for (country, reason) in &report.selection.rejected {
            let _ = writeln!(output, "- {country}: {reason}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Country Summaries");
    if report.summaries.is_empty() {
        let _ = writeln!(output, "No countries in the source.");
    } else {
        for summary in &report.summaries {
            let _ = writeln!(output, "{}", summary_line(summary));
        }
    }

    output
}

pub fn build_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
