//! Outcomes, status histogram and the final run report

use crate::traits::RequestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Result of one completed request attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered with this status code
    Status(u16),
    /// The attempt failed without a status
    Error(RequestError),
}

impl Outcome {
    /// Whether the attempt produced a status code
    pub fn is_status(&self) -> bool {
        matches!(self, Outcome::Status(_))
    }
}

impl From<Result<u16, RequestError>> for Outcome {
    fn from(result: Result<u16, RequestError>) -> Self {
        match result {
            Ok(code) => Outcome::Status(code),
            Err(err) => Outcome::Error(err),
        }
    }
}

// ============================================================================
// Status Histogram
// ============================================================================

/// Bytes per encoded histogram entry: `u16` code + `u32` count
const ENTRY_LEN: usize = 6;

/// Occurrence count per HTTP status code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistogram(BTreeMap<u16, u64>);

impl StatusHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `code`
    pub fn record(&mut self, code: u16) {
        self.add(code, 1);
    }

    /// Count `n` occurrences of `code`
    pub fn add(&mut self, code: u16, n: u64) {
        *self.0.entry(code).or_insert(0) += n;
    }

    /// Occurrences of `code`
    pub fn get(&self, code: u16) -> u64 {
        self.0.get(&code).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct codes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no code has been recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(code, count)` in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = (u16, u64)> + '_ {
        self.0.iter().map(|(code, n)| (*code, *n))
    }

    /// Add every count of `other` into this histogram
    pub fn merge(&mut self, other: &StatusHistogram) {
        for (code, n) in other.iter() {
            self.add(code, n);
        }
    }

    /// Encode as packed little-endian `(u16 code, u32 count)` records
    ///
    /// # Errors
    /// Fails if any count does not fit in 32 bits.
    pub fn encode(&self) -> Result<Vec<u8>, HistogramCodecError> {
        let mut buf = Vec::with_capacity(self.0.len() * ENTRY_LEN);
        for (code, n) in self.iter() {
            let n = u32::try_from(n)
                .map_err(|_| HistogramCodecError::CountOverflow { code, count: n })?;
            buf.extend_from_slice(&code.to_le_bytes());
            buf.extend_from_slice(&n.to_le_bytes());
        }
        Ok(buf)
    }

    /// Merge records produced by [`encode`](Self::encode) into this histogram
    ///
    /// # Errors
    /// Fails without modifying the histogram if `data` does not hold a whole
    /// number of records.
    pub fn decode_merge(&mut self, data: &[u8]) -> Result<(), HistogramCodecError> {
        let trailing = data.len() % ENTRY_LEN;
        if trailing != 0 {
            return Err(HistogramCodecError::Truncated {
                len: data.len(),
                trailing,
            });
        }

        for record in data.chunks_exact(ENTRY_LEN) {
            let code = u16::from_le_bytes([record[0], record[1]]);
            let n = u32::from_le_bytes([record[2], record[3], record[4], record[5]]);
            self.add(code, u64::from(n));
        }
        Ok(())
    }

    /// Decode a histogram from its binary form
    pub fn decode(data: &[u8]) -> Result<Self, HistogramCodecError> {
        let mut histogram = Self::new();
        histogram.decode_merge(data)?;
        Ok(histogram)
    }
}

impl fmt::Display for StatusHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (code, n)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{code}: {n}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(u16, u64)> for StatusHistogram {
    fn from_iter<T: IntoIterator<Item = (u16, u64)>>(iter: T) -> Self {
        let mut histogram = Self::new();
        for (code, n) in iter {
            histogram.add(code, n);
        }
        histogram
    }
}

/// Binary histogram encoding errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HistogramCodecError {
    /// Input length is not a multiple of the record size
    #[error("histogram data of {len} bytes has {trailing} trailing bytes")]
    Truncated {
        /// Total input length
        len: usize,
        /// Bytes past the last whole record
        trailing: usize,
    },

    /// A count is too large for the 32-bit wire field
    #[error("count {count} for status {code} does not fit in 32 bits")]
    CountOverflow {
        /// Status code
        code: u16,
        /// Offending count
        count: u64,
    },
}

// ============================================================================
// Run Report
// ============================================================================

/// Final statistics of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Requests per status code
    pub histogram: StatusHistogram,

    /// Attempts that produced no status
    pub errors: u64,

    /// Span from the first worker start to the last worker end
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,

    /// Configured request budget
    pub requests: u64,

    /// Wall-clock time the run started
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl RunReport {
    /// Attempts actually made (statuses plus errors)
    pub fn attempts(&self) -> u64 {
        self.histogram.total() + self.errors
    }

    /// Attempts per second of elapsed time
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts() as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of attempts that produced a status (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let attempts = self.attempts();
        if attempts > 0 {
            self.histogram.total() as f64 / attempts as f64
        } else {
            0.0
        }
    }

    /// Whether every budgeted request was attempted
    pub fn is_complete(&self) -> bool {
        self.attempts() == self.requests
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(histogram: StatusHistogram, errors: u64, elapsed: Duration) -> RunReport {
        RunReport {
            histogram,
            errors,
            elapsed,
            requests: 10,
            started_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_histogram_record() {
        let mut histogram = StatusHistogram::new();
        for _ in 0..7 {
            histogram.record(200);
        }
        histogram.record(500);
        histogram.record(500);

        assert_eq!(histogram.get(200), 7);
        assert_eq!(histogram.get(500), 2);
        assert_eq!(histogram.get(404), 0);
        assert_eq!(histogram.total(), 9);
        assert_eq!(histogram.len(), 2);
    }

    #[test]
    fn test_histogram_display() {
        let histogram: StatusHistogram = [(500, 2), (200, 7)].into_iter().collect();
        assert_eq!(histogram.to_string(), "{200: 7, 500: 2}");
        assert_eq!(StatusHistogram::new().to_string(), "{}");
    }

    #[test]
    fn test_histogram_json_is_plain_map() {
        let histogram: StatusHistogram = [(200, 3)].into_iter().collect();
        assert_eq!(serde_json::to_string(&histogram).unwrap(), r#"{"200":3}"#);
    }

    #[test]
    fn test_histogram_binary_layout() {
        let histogram: StatusHistogram = [(200, 7)].into_iter().collect();
        assert_eq!(histogram.encode().unwrap(), vec![0xC8, 0x00, 7, 0, 0, 0]);
    }

    #[test]
    fn test_histogram_decode_merges_into_existing() {
        let remote: StatusHistogram = [(200, 5), (503, 1)].into_iter().collect();
        let data = remote.encode().unwrap();

        let mut local: StatusHistogram = [(200, 2), (404, 4)].into_iter().collect();
        local.decode_merge(&data).unwrap();

        assert_eq!(local.get(200), 7);
        assert_eq!(local.get(404), 4);
        assert_eq!(local.get(503), 1);
    }

    #[test]
    fn test_histogram_decode_rejects_truncated() {
        let mut histogram: StatusHistogram = [(200, 1)].into_iter().collect();
        let err = histogram.decode_merge(&[0xC8, 0x00, 1, 0, 0, 0, 0x2C]).unwrap_err();

        assert_eq!(err, HistogramCodecError::Truncated { len: 7, trailing: 1 });
        assert_eq!(histogram.get(200), 1);
    }

    #[test]
    fn test_histogram_encode_rejects_large_count() {
        let histogram: StatusHistogram = [(200, u64::from(u32::MAX) + 1)].into_iter().collect();
        assert!(matches!(
            histogram.encode(),
            Err(HistogramCodecError::CountOverflow { code: 200, .. })
        ));
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(Outcome::from(Ok(204)), Outcome::Status(204));
        let outcome = Outcome::from(Err(RequestError::Connect("refused".into())));
        assert!(!outcome.is_status());
    }

    #[test]
    fn test_report_derived_figures() {
        let histogram: StatusHistogram = [(200, 7), (500, 2)].into_iter().collect();
        let report = report(histogram, 1, Duration::from_secs(2));

        assert_eq!(report.attempts(), 10);
        assert!(report.is_complete());
        assert!((report.throughput() - 5.0).abs() < f64::EPSILON);
        assert!((report.success_rate() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_report_zero_elapsed() {
        let report = report(StatusHistogram::new(), 0, Duration::ZERO);
        assert_eq!(report.throughput(), 0.0);
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_report_json() {
        let histogram: StatusHistogram = [(200, 10)].into_iter().collect();
        let report = report(histogram, 0, Duration::from_millis(1500));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["histogram"]["200"], 10);
        assert_eq!(json["errors"], 0);
        assert_eq!(json["elapsed"], 1.5);
        assert_eq!(json["requests"], 10);
    }
}
