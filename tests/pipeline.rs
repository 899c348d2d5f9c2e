use std::io::Write;

use covid_testing_regression::cohort::RejectionReason;
use covid_testing_regression::{run, PipelineConfig, PipelineError, PopulationPolicy};
use tempfile::NamedTempFile;

const HEADER: &str = "iso_code,continent,location,date,total_cases,total_tests,weekly_hosp_admissions,total_deaths,population";

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn sample_rows() -> Vec<&'static str> {
    vec![
        "CHL,South America,Chile,2021-01-04,10,1000,12,5,100000",
        "CHL,South America,Chile,2021-01-11,20,,8,,100000",
        "CHL,South America,Chile,2021-01-18,30,4000,,9,100000",
        "PER,South America,Peru,2021-01-04,10,2000,20,12,200000",
        "PER,South America,Peru,2021-01-11,10,5000,20,16,200000",
        "BOL,South America,Bolivia,2021-01-04,5,900,4,2,50000",
        "ECU,South America,Ecuador,2021-01-04,5,1500,,7,100000",
        "ERI,Africa,Eritrea,2021-01-04,5,,2,1,3500000",
        "OWID_EUR,,Europe,2021-01-04,5,90000000,500000,100000,740000000",
        "AUS,Oceania,Australia,2021-01-04,5,800000,300,90,25000000",
    ]
}

#[test]
fn csv_to_regressions() {
    let file = write_csv(&sample_rows());
    let report = run(&PipelineConfig::new(file.path())).unwrap();

    assert_eq!(report.observation_count, 10);
    assert_eq!(report.summaries.len(), 8);

    let chile = report
        .summaries
        .iter()
        .find(|summary| summary.country == "Chile")
        .unwrap();
    assert_eq!(chile.tests_total, Some(4000.0));
    assert_eq!(chile.hospitalizations_total, 20.0);
    assert_eq!(chile.deaths_total, Some(9.0));

    let eritrea = report
        .summaries
        .iter()
        .find(|summary| summary.country == "Eritrea")
        .unwrap();
    assert_eq!(eritrea.tests_total, None);

    let rejected = &report.selection.rejected;
    assert_eq!(rejected.get("Europe"), Some(&RejectionReason::AggregateRegion));
    assert_eq!(rejected.get("Eritrea"), Some(&RejectionReason::NoTestingData));
    assert!(!rejected.contains_key("Australia"));

    let hospitalizations = report.hospitalizations.normalized.as_ref().unwrap();
    let countries: Vec<&str> = hospitalizations
        .rows
        .iter()
        .map(|row| row.country.as_str())
        .collect();
    assert_eq!(countries, vec!["Australia", "Bolivia", "Chile", "Peru"]);
    assert_eq!(report.hospitalizations.excluded, vec!["Ecuador"]);

    let peru = hospitalizations
        .rows
        .iter()
        .find(|row| row.country == "Peru")
        .unwrap();
    assert!((peru.tests_per_100k - 2500.0).abs() < 1e-9);
    assert!((peru.outcome_per_100k - 20.0).abs() < 1e-9);

    assert_eq!(report.deaths.normalized.as_ref().unwrap().rows.len(), 5);
    assert!(report.hospitalizations.regression.is_ok());
    assert!(report.deaths.regression.is_ok());
}

#[test]
fn inconsistent_population_halts_the_run() {
    let mut rows = sample_rows();
    rows.push("PER,South America,Peru,2021-01-18,10,6000,20,18,210000");
    rows.push("BOL,South America,Bolivia,2021-01-11,5,950,4,2,51000");
    let file = write_csv(&rows);

    match run(&PipelineConfig::new(file.path())).unwrap_err() {
        PipelineError::InconsistentPopulation(offenders) => {
            let countries: Vec<&str> = offenders.iter().map(|o| o.country.as_str()).collect();
            assert_eq!(countries, vec!["Bolivia", "Peru"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let config =
        PipelineConfig::new(file.path()).with_population_policy(PopulationPolicy::Proceed);
    let report = run(&config).unwrap();
    assert_eq!(report.population_caveats.len(), 2);
}

#[test]
fn missing_columns_are_a_schema_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "location,date,population").unwrap();
    writeln!(file, "Chile,2021-01-04,100000").unwrap();
    file.flush().unwrap();

    match run(&PipelineConfig::new(file.path())).unwrap_err() {
        PipelineError::Schema { missing } => assert_eq!(missing.len(), 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn reruns_produce_identical_results() {
    let file = write_csv(&sample_rows());
    let config = PipelineConfig::new(file.path());
    let first = run(&config).unwrap();
    let second = run(&config).unwrap();
    assert_eq!(first.summaries, second.summaries);
    assert_eq!(first.selection, second.selection);
    assert_eq!(first.deaths.regression, second.deaths.regression);
    assert_ne!(first.run_id, second.run_id);
}

#[test]
fn blank_population_on_an_aggregate_row_is_tolerated() {
    let mut rows = sample_rows();
    rows.push("OWID_INT,,International,2021-01-04,5,,,15,");
    let file = write_csv(&rows);

    let report = run(&PipelineConfig::new(file.path())).unwrap();
    assert_eq!(
        report.selection.rejected.get("International"),
        Some(&RejectionReason::AggregateRegion)
    );
    assert!(report.hospitalizations.regression.is_ok());
    assert!(report.deaths.regression.is_ok());
}

#[test]
fn blank_population_on_an_analysed_country_fails() {
    let mut rows = sample_rows();
    rows.push("URY,South America,Uruguay,2021-01-04,5,700,3,2,");
    let file = write_csv(&rows);

    match run(&PipelineConfig::new(file.path())).unwrap_err() {
        PipelineError::MissingPopulation(countries) => assert_eq!(countries, vec!["Uruguay"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn non_finite_cells_are_malformed() {
    let mut rows = sample_rows();
    rows.push("CHL,South America,Chile,2021-01-25,40,,NaN,,100000");
    let file = write_csv(&rows);

    match run(&PipelineConfig::new(file.path())).unwrap_err() {
        PipelineError::DataSource(message) => assert!(message.contains("invalid number")),
        other => panic!("unexpected error: {other:?}"),
    }
}
