use crate::types::RunStatistics;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use ::time::{format_description::well_known, OffsetDateTime};

/// Machine-readable record of a finished run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunReport {
    pub url: String,
    pub finished_at: String,
    pub requested: u64,
    pub completed: u64,
    pub cancelled: bool,
    pub success_rate: f64,
    pub statistics: RunStatistics,
}

impl RunReport {
    pub fn new(url: &str, requested: u64, cancelled: bool, statistics: RunStatistics) -> Self {
        Self {
            url: url.to_string(),
            finished_at: now_rfc3339(),
            requested,
            completed: statistics.count,
            cancelled,
            success_rate: statistics.success_rate(),
            statistics,
        }
    }
}

/// The human-readable summary block printed once after the loop.
pub fn render_summary(url: &str, stats: &RunStatistics) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "\nFinished testing url: {}. Total time spent: {:.4} s.\n\n",
        url,
        stats.total_ms / 1000.0
    ));
    s.push_str("-------------- Connection Stats (ms) ------------------\n");
    s.push_str(" Fastest | Slowest |  Mean   | Median\n");
    s.push_str(&format!(
        " {:7.3} | {:7.3} | {:7.3} | {:7.3}\n",
        stats.fastest_ms, stats.slowest_ms, stats.mean_ms, stats.median_ms
    ));
    s.push_str("----------------- Content Size (KB) -------------------\n");
    s.push_str(" Largest | Smallest | Success Rate\n");
    s.push_str(&format!(
        " {:7.3} | {:8.3} | {:6.2}%\n",
        stats.largest_bytes as f64 / 1024.0,
        stats.smallest_bytes as f64 / 1024.0,
        stats.success_rate()
    ));
    s
}

/// Write the report as pretty JSON.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> RunStatistics {
        RunStatistics {
            count: 5,
            success_count: 3,
            fastest_ms: 1.5,
            slowest_ms: 9.25,
            mean_ms: 4.0,
            median_ms: 3.5,
            total_ms: 20.0,
            largest_bytes: 2048,
            smallest_bytes: 0,
        }
    }

    #[test]
    fn summary_contains_all_figures() {
        let out = render_summary("example.com", &stats());
        assert!(out.contains("Finished testing url: example.com. Total time spent: 0.0200 s."));
        assert!(out.contains("   1.500 |   9.250 |   4.000 |   3.500"));
        assert!(out.contains("   2.000 |    0.000 |  60.00%"));
    }

    #[test]
    fn report_json_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = RunReport::new("example.com", 5, false, stats());
        write_report_json(&path, &report).unwrap();
        let back: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.completed, 5);
        assert_eq!(back.success_rate, 60.0);
        assert_eq!(back.statistics, report.statistics);
    }
}
