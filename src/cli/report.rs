//! Text summary of a finished run

use std::fmt::Write;

use http_bench_core::RunReport;

/// Render the human-readable summary printed after a run
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "\n{}", "=".repeat(50));
    let _ = writeln!(out, "Requests:      {} / {}", report.attempts(), report.requests);
    let _ = writeln!(out, "Errors:        {}", report.errors);
    let _ = writeln!(out, "Status codes:  {}", report.histogram);
    let _ = writeln!(out, "Elapsed:       {:.3}s", report.elapsed.as_secs_f64());
    let _ = writeln!(out, "Throughput:    {:.3} requests/second", report.throughput());
    let _ = writeln!(out, "{}", "=".repeat(50));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_summary_lines() {
        let report = RunReport {
            histogram: [(200, 7), (500, 2)].into_iter().collect(),
            errors: 1,
            elapsed: Duration::from_millis(2500),
            requests: 10,
            started_at: chrono::Utc::now(),
        };

        let summary = render_summary(&report);

        assert!(summary.contains("Requests:      10 / 10"));
        assert!(summary.contains("Errors:        1"));
        assert!(summary.contains("Status codes:  {200: 7, 500: 2}"));
        assert!(summary.contains("Elapsed:       2.500s"));
        assert!(summary.contains("Throughput:    4.000 requests/second"));
    }

    #[test]
    fn test_summary_for_empty_run() {
        let report = RunReport {
            histogram: Default::default(),
            errors: 0,
            elapsed: Duration::ZERO,
            requests: 0,
            started_at: chrono::Utc::now(),
        };

        let summary = render_summary(&report);
        assert!(summary.contains("Status codes:  {}"));
        assert!(summary.contains("Throughput:    0.000 requests/second"));
    }
}
