//! Row sinks for datagen.
//!
//! A sink receives batches of rows and writes the non-ghost fields of each
//! row, in declared order, to a file or to standard output.
//!
//! # Example
//!
//! ```ignore
//! use datagen_sink::{create_sink, SinkFormat};
//!
//! let columns = vec!["id".to_string(), "name".to_string()];
//! let mut sink = create_sink(SinkFormat::Csv, Some(Path::new("out.csv")), columns)?;
//! sink.write_rows(&batch.rows)?;
//! let metrics = sink.finish()?;
//! ```

mod csv_sink;
mod error;
mod jsonl_sink;
mod metrics;

pub use csv_sink::CsvSink;
pub use error::SinkError;
pub use jsonl_sink::JsonlSink;
pub use metrics::{CountingWriter, SinkMetrics};

use datagen_core::Row;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Default buffer size for output writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Destination for generated rows.
pub trait RowSink: Send {
    /// Write a batch of rows.
    fn write_rows(&mut self, rows: &[Row]) -> Result<(), SinkError>;

    /// Flush the output and report metrics.
    fn finish(self: Box<Self>) -> Result<SinkMetrics, SinkError>;
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SinkFormat {
    /// Comma-separated values with a header line
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl fmt::Display for SinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkFormat::Csv => write!(f, "csv"),
            SinkFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Open a buffered writer on `path`, or on standard output.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>, SinkError> {
    let writer: Box<dyn Write + Send> = match path {
        Some(path) => Box::new(BufWriter::with_capacity(
            DEFAULT_BUFFER_SIZE,
            File::create(path)?,
        )),
        None => Box::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, io::stdout())),
    };
    Ok(writer)
}

/// Create a sink writing `columns` in `format`.
pub fn create_sink(
    format: SinkFormat,
    path: Option<&Path>,
    columns: Vec<String>,
) -> Result<Box<dyn RowSink>, SinkError> {
    match path {
        Some(path) => info!("Writing {format} output to '{}'", path.display()),
        None => info!("Writing {format} output to stdout"),
    }
    let writer = open_output(path)?;
    let sink: Box<dyn RowSink> = match format {
        SinkFormat::Csv => Box::new(CsvSink::new(writer, columns, true)?),
        SinkFormat::Jsonl => Box::new(JsonlSink::new(writer, columns)),
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_sink_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.jsonl");
        let mut sink = create_sink(
            SinkFormat::Jsonl,
            Some(&path),
            vec!["id".to_string()],
        )
        .unwrap();
        sink.write_rows(&[Row::builder(0).field("id", 7).build()])
            .unwrap();
        let metrics = sink.finish().unwrap();

        assert_eq!(metrics.rows_written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"id\":7}\n");
        assert_eq!(metrics.bytes_written, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(SinkFormat::Csv.to_string(), "csv");
        assert_eq!(SinkFormat::Jsonl.to_string(), "jsonl");
        assert_eq!(SinkFormat::default(), SinkFormat::Csv);
    }
}
