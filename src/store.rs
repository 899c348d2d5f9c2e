//! Loading the raw observation table from CSV.

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// The source table as read: a header row plus every data row.
///
/// Rows are guaranteed to have the same width as the header. Header names
/// are trimmed on load.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RecordTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn load(path: &Path) -> Result<RecordTable> {
    let file = std::fs::File::open(path).map_err(|err| {
        PipelineError::DataSource(format!("cannot open {}: {err}", path.display()))
    })?;
    let table = load_from_reader(file)?;
    debug!(path = %path.display(), rows = table.len(), "loaded source table");
    Ok(table)
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(PipelineError::DataSource("source has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result?);
    }

    Ok(RecordTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let data = "location,date,population\nChile,2021-01-01,19000000\n";
        let table = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.column_index("date"), Some(1));
        assert_eq!(table.column_index("total_tests"), None);
    }

    #[test]
    fn header_names_are_trimmed_once() {
        let data = " location ,date\nChile,2021-01-01\n";
        let table = load_from_reader(data.as_bytes()).unwrap();
        assert_eq!(&table.headers[0], "location");
        assert_eq!(table.column_index("location"), Some(0));
    }

    #[test]
    fn ragged_rows_are_a_data_source_error() {
        let data = "location,date,population\nChile,2021-01-01\n";
        let err = load_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::DataSource(_)));
    }

    #[test]
    fn unreadable_path_is_a_data_source_error() {
        let err = load(Path::new("/nonexistent/owid-covid-data.csv")).unwrap_err();
        match err {
            PipelineError::DataSource(message) => assert!(message.contains("cannot open")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
