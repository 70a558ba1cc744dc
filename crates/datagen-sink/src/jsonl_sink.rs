//! JSON Lines output.

use crate::error::SinkError;
use crate::metrics::{CountingWriter, SinkMetrics};
use crate::RowSink;
use datagen_core::{FieldValue, Row};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info};

/// Writes one JSON object per row and line.
///
/// Numbers and booleans stay typed; structured values are rendered as their
/// display name and missing or null values as `null`.
pub struct JsonlSink<W: Write> {
    writer: CountingWriter<W>,
    columns: Vec<String>,
    rows_written: u64,
    started: Instant,
}

/// A row restricted to the output columns, serialized in column order.
struct OutputRow<'a> {
    row: &'a Row,
    columns: &'a [String],
}

impl Serialize for OutputRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in self.columns {
            map.serialize_entry(column, self.row.get(column).unwrap_or(&FieldValue::Null))?;
        }
        map.end()
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W, columns: Vec<String>) -> Self {
        Self {
            writer: CountingWriter::new(writer),
            columns,
            rows_written: 0,
            started: Instant::now(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl<W: Write + Send> RowSink for JsonlSink<W> {
    fn write_rows(&mut self, rows: &[Row]) -> Result<(), SinkError> {
        for row in rows {
            let output = OutputRow {
                row,
                columns: &self.columns,
            };
            serde_json::to_writer(&mut self.writer, &output)?;
            self.writer.write_all(b"\n")?;
            self.rows_written += 1;
            if self.rows_written % 10000 == 0 {
                debug!("Written {} rows", self.rows_written);
            }
        }
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<SinkMetrics, SinkError> {
        self.writer.flush()?;
        let metrics = SinkMetrics {
            rows_written: self.rows_written,
            bytes_written: self.writer.bytes(),
            total_duration: self.started.elapsed(),
        };
        info!(
            "JSONL output complete: {} rows, {} bytes in {:?} ({:.2} rows/sec)",
            metrics.rows_written,
            metrics.bytes_written,
            metrics.total_duration,
            metrics.rows_per_second()
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagen_core::PersonName;
    use serde_json::{json, Value};
    use tempfile::NamedTempFile;

    #[test]
    fn test_jsonl_output() {
        let file = NamedTempFile::new().unwrap();
        let columns = vec![
            "id".to_string(),
            "name".to_string(),
            "score".to_string(),
            "active".to_string(),
            "missing".to_string(),
        ];
        let name = PersonName {
            first_name: "Camille".to_string(),
            country: "France".to_string(),
            male: false,
            female: false,
            unisex: true,
        };
        let rows = vec![
            Row::builder(0)
                .field("id", 1_i64)
                .field("name", name)
                .field("score", 0.5)
                .field("active", true)
                .field("ghost", "hidden")
                .build(),
            Row::builder(1).field("id", 2_i64).build(),
        ];

        let mut sink = Box::new(JsonlSink::new(file.reopen().unwrap(), columns));
        sink.write_rows(&rows).unwrap();
        let metrics = sink.finish().unwrap();
        assert_eq!(metrics.rows_written, 2);

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(metrics.bytes_written, content.len() as u64);
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines[0],
            json!({"id": 1, "name": "Camille", "score": 0.5, "active": true, "missing": null})
        );
        assert_eq!(lines[1]["id"], json!(2));
        assert_eq!(lines[1]["name"], Value::Null);

        // Columns keep their order
        assert!(content.starts_with("{\"id\":1,\"name\":\"Camille\""));
    }
}
