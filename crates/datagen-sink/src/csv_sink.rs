//! CSV output.

use crate::error::SinkError;
use crate::metrics::{CountingWriter, SinkMetrics};
use crate::RowSink;
use csv::Writer;
use datagen_core::Row;
use std::borrow::Cow;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info};

/// Writes rows as CSV, one column per output field.
///
/// Values are rendered the way rules see them: structured values as their
/// display name and nulls as empty cells.
pub struct CsvSink<W: Write> {
    writer: Writer<CountingWriter<W>>,
    columns: Vec<String>,
    rows_written: u64,
    started: Instant,
}

impl<W: Write> CsvSink<W> {
    /// Create a sink, writing the header row if requested.
    pub fn new(writer: W, columns: Vec<String>, include_header: bool) -> Result<Self, SinkError> {
        let mut writer = Writer::from_writer(CountingWriter::new(writer));
        if include_header {
            writer.write_record(&columns)?;
        }
        Ok(Self {
            writer,
            columns,
            rows_written: 0,
            started: Instant::now(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Convert a row to a CSV record in column order.
    fn record<'a>(&self, row: &'a Row) -> Vec<Cow<'a, str>> {
        self.columns
            .iter()
            .map(|column| row.get_string(column).unwrap_or_default())
            .collect()
    }
}

impl<W: Write + Send> RowSink for CsvSink<W> {
    fn write_rows(&mut self, rows: &[Row]) -> Result<(), SinkError> {
        for row in rows {
            let record = self.record(row);
            self.writer
                .write_record(record.iter().map(|value| value.as_bytes()))?;
            self.rows_written += 1;
            if self.rows_written % 10000 == 0 {
                debug!("Written {} rows", self.rows_written);
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<SinkMetrics, SinkError> {
        let Self {
            mut writer,
            rows_written,
            started,
            ..
        } = *self;
        writer.flush()?;
        let counting = writer
            .into_inner()
            .map_err(|e| SinkError::Io(std::io::Error::other(e.to_string())))?;

        let metrics = SinkMetrics {
            rows_written,
            bytes_written: counting.bytes(),
            total_duration: started.elapsed(),
        };
        info!(
            "CSV output complete: {} rows, {} bytes in {:?} ({:.2} rows/sec)",
            metrics.rows_written,
            metrics.bytes_written,
            metrics.total_duration,
            metrics.rows_per_second()
        );
        Ok(metrics)
    }
}
