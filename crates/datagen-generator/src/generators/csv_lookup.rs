//! Records of an external CSV file for `csv` fields.

use crate::error::GeneratorError;
use datagen_core::{CsvRecord, FieldDefinition};
use indexmap::IndexMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Default CSV delimiter.
pub const DEFAULT_SEPARATOR: char = ';';

/// A `column=value` filter, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFilter {
    pub column: String,
    pub value: String,
}

impl CsvFilter {
    pub fn parse(field: &str, filter: &str) -> Result<Self, GeneratorError> {
        match filter.split_once('=') {
            Some((column, value)) if !column.trim().is_empty() => Ok(Self {
                column: column.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(GeneratorError::InvalidFilter {
                field: field.to_string(),
                filter: filter.to_string(),
            }),
        }
    }

    pub fn matches(&self, record: &CsvRecord) -> bool {
        record
            .get(&self.column)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(&self.value))
    }
}

/// Load the records of a `csv` field, keeping those that match every filter.
///
/// Returns `None` if the field has no `file` or no display column.
pub fn load_field_records(
    definition: &FieldDefinition,
) -> Result<Option<Vec<Arc<CsvRecord>>>, GeneratorError> {
    let (Some(path), Some(display)) = (&definition.file, &definition.field) else {
        return Ok(None);
    };
    let filters = definition
        .filters
        .iter()
        .map(|f| CsvFilter::parse(&definition.name, f))
        .collect::<Result<Vec<_>, _>>()?;
    let separator = definition.separator.unwrap_or(DEFAULT_SEPARATOR);
    let records = load_records(path, separator, display, &filters)?;
    debug!(
        "Loaded {} record(s) from {} for field '{}'",
        records.len(),
        path.display(),
        definition.name
    );
    Ok(Some(records))
}

/// Read a CSV file with a header line into records.
pub fn load_records(
    path: &Path,
    separator: char,
    display_column: &str,
    filters: &[CsvFilter],
) -> Result<Vec<Arc<CsvRecord>>, GeneratorError> {
    let csv_error = |source: csv::Error| GeneratorError::CsvFile {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(u8::try_from(separator).unwrap_or(b';'))
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let required = std::iter::once(display_column).chain(filters.iter().map(|f| f.column.as_str()));
    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(GeneratorError::UnknownCsvColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        let columns: IndexMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        let record = CsvRecord::new(display_column, columns);
        if filters.iter().all(|f| f.matches(&record)) {
            records.push(Arc::new(record));
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn products() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sku;label;category").unwrap();
        writeln!(file, "A1;Kettle;kitchen").unwrap();
        writeln!(file, "B2;Toaster;Kitchen").unwrap();
        writeln!(file, "C3;Drill;garage").unwrap();
        file
    }

    #[test]
    fn test_load_records() {
        let file = products();
        let records = load_records(file.path(), ';', "label", &[]).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].display_value(), "Kettle");
        assert_eq!(records[2].get("sku"), Some("C3"));
    }

    #[test]
    fn test_filters_ignore_case() {
        let file = products();
        let filter = CsvFilter::parse("product", "category=KITCHEN").unwrap();
        let records = load_records(file.path(), ';', "label", &[filter]).unwrap();
        let labels: Vec<_> = records.iter().map(|r| r.display_value()).collect();
        assert_eq!(labels, vec!["Kettle", "Toaster"]);
    }

    #[test]
    fn test_invalid_filter_and_column() {
        assert!(matches!(
            CsvFilter::parse("product", "category"),
            Err(GeneratorError::InvalidFilter { .. })
        ));

        let file = products();
        assert!(matches!(
            load_records(file.path(), ';', "price", &[]),
            Err(GeneratorError::UnknownCsvColumn { column, .. }) if column == "price"
        ));
    }

    #[test]
    fn test_load_field_records_requires_file() {
        let definition = FieldDefinition::new("product", datagen_core::FieldKind::Csv);
        assert!(load_field_records(&definition).unwrap().is_none());

        let file = products();
        let mut definition = definition;
        definition.file = Some(file.path().to_path_buf());
        definition.field = Some("sku".to_string());
        definition.filters = vec!["category=garage".to_string()];
        let records = load_field_records(&definition).unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_value(), "C3");
    }
}
