//! Column projection: keep the fields the analysis needs, typed.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::{PipelineError, Result};
use crate::models::RawObservation;
use crate::store::RecordTable;

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "location",
    "date",
    "total_tests",
    "weekly_hosp_admissions",
    "total_deaths",
    "population",
];

#[derive(Deserialize)]
struct SourceRow {
    #[serde(rename = "location")]
    country: String,
    date: NaiveDate,
    #[serde(deserialize_with = "optional_number")]
    total_tests: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    weekly_hosp_admissions: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    total_deaths: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    population: Option<f64>,
}

/// Empty and `NA` cells are missing, never zero. `NaN` and infinities are malformed.
fn optional_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(serde::de::Error::custom(format!("invalid number {trimmed:?}"))),
    }
}

pub fn project(table: &RecordTable) -> Result<Vec<RawObservation>> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| table.column_index(column).is_none())
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema { missing });
    }

    let mut observations = Vec::with_capacity(table.len());
    for record in &table.rows {
        let row: SourceRow = record.deserialize(Some(&table.headers))?;
        observations.push(RawObservation {
            country: row.country,
            date: row.date,
            total_tests: row.total_tests,
            weekly_hosp_admissions: row.weekly_hosp_admissions,
            total_deaths: row.total_deaths,
            population: row.population,
        });
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::load_from_reader;

    const HEADER: &str =
        "iso_code,location,date,total_tests,weekly_hosp_admissions,total_deaths,population";

    fn table(body: &str) -> RecordTable {
        load_from_reader(format!("{HEADER}\n{body}").as_bytes()).unwrap()
    }

    #[test]
    fn renames_location_and_keeps_missing_cells() {
        let observations = project(&table("CHL,Chile,2021-03-01,,12,NA,19000000\n")).unwrap();
        assert_eq!(observations.len(), 1);
        let row = &observations[0];
        assert_eq!(row.country, "Chile");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
        assert_eq!(row.total_tests, None);
        assert_eq!(row.weekly_hosp_admissions, Some(12.0));
        assert_eq!(row.total_deaths, None);
        assert_eq!(row.population, Some(19_000_000.0));
    }

    #[test]
    fn zero_is_not_missing() {
        let observations = project(&table("CHL,Chile,2021-03-01,0,0,0,19000000\n")).unwrap();
        assert_eq!(observations[0].total_tests, Some(0.0));
        assert_eq!(observations[0].total_deaths, Some(0.0));
    }

    #[test]
    fn reports_every_missing_column() {
        let table = load_from_reader("location,date,population\nChile,2021-03-01,1\n".as_bytes())
            .unwrap();
        match project(&table).unwrap_err() {
            PipelineError::Schema { missing } => assert_eq!(
                missing,
                vec!["total_tests", "weekly_hosp_admissions", "total_deaths"]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_values_are_data_source_errors() {
        let err = project(&table("CHL,Chile,yesterday,1,1,1,19000000\n")).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));

        let err = project(&table("CHL,Chile,2021-03-01,lots,1,1,19000000\n")).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
    }

    #[test]
    fn non_finite_numbers_are_malformed() {
        for cell in ["NaN", "inf", "-infinity"] {
            let body = format!("CHL,Chile,2021-03-01,10,{cell},1,19000000\n");
            match project(&table(&body)).unwrap_err() {
                PipelineError::DataSource(message) => assert!(message.contains("invalid number")),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn headers_with_surrounding_spaces_still_project() {
        let data = " location , date,total_tests,weekly_hosp_admissions,total_deaths,population\n\
                    Chile,2021-03-01,10,2,1,19000000\n";
        let table = load_from_reader(data.as_bytes()).unwrap();
        let observations = project(&table).unwrap();
        assert_eq!(observations[0].country, "Chile");
        assert_eq!(observations[0].total_tests, Some(10.0));
    }

    #[test]
    fn blank_population_is_carried_as_missing() {
        let observations =
            project(&table("OWID_INT,International,2021-03-01,,,15,\n")).unwrap();
        assert_eq!(observations[0].country, "International");
        assert_eq!(observations[0].population, None);
    }
}
