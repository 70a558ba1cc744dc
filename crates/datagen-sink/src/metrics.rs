//! Write metrics and byte counting.

use std::io::{self, Write};
use std::time::Duration;

/// Metrics from writing rows to a sink.
#[derive(Debug, Clone, Default)]
pub struct SinkMetrics {
    /// Number of rows written.
    pub rows_written: u64,
    /// Bytes written, header included.
    pub bytes_written: u64,
    /// Time from opening the sink to finishing it.
    pub total_duration: Duration,
}

impl SinkMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.bytes_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Writer that counts the bytes passed through it.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = SinkMetrics {
            rows_written: 1000,
            bytes_written: 100000,
            total_duration: Duration::from_secs(10),
        };

        assert_eq!(metrics.rows_per_second(), 100.0);
        assert_eq!(metrics.bytes_per_second(), 10000.0);
        assert_eq!(SinkMetrics::default().rows_per_second(), 0.0);
    }

    #[test]
    fn test_counting_writer() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"hello").unwrap();
        writer.write_all(b", world").unwrap();
        assert_eq!(writer.bytes(), 12);
        assert_eq!(writer.into_inner(), b"hello, world");
    }
}
