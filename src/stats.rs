use crate::error::ProbeError;
use crate::types::{IterationResult, RunStatistics};

/// Running aggregate over iteration results.
///
/// Keeps every elapsed time (exact median needs the full sample) plus running
/// min/max/sum. Size extremes cover all iterations, failed zero-byte ones included.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    samples_ms: Vec<f64>,
    success_count: u64,
    total_ms: f64,
    fastest_ms: f64,
    slowest_ms: f64,
    largest_bytes: u64,
    smallest_bytes: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the sample buffer for a known repeat count.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            samples_ms: Vec::with_capacity(n),
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: &IterationResult) {
        let first = self.samples_ms.is_empty();
        let ms = result.elapsed_ms;
        let size = result.body_size_bytes;

        if first {
            self.fastest_ms = ms;
            self.slowest_ms = ms;
            self.largest_bytes = size;
            self.smallest_bytes = size;
        } else {
            self.fastest_ms = self.fastest_ms.min(ms);
            self.slowest_ms = self.slowest_ms.max(ms);
            self.largest_bytes = self.largest_bytes.max(size);
            self.smallest_bytes = self.smallest_bytes.min(size);
        }

        self.samples_ms.push(ms);
        self.total_ms += ms;
        if result.success {
            self.success_count += 1;
        }
    }

    /// Number of recorded iterations.
    pub fn count(&self) -> usize {
        self.samples_ms.len()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples_ms
    }

    /// Compute the final statistics. Sorts a copy, so calling it again yields the same result.
    pub fn finalize(&self) -> Result<RunStatistics, ProbeError> {
        let n = self.samples_ms.len();
        if n == 0 {
            return Err(ProbeError::InsufficientData);
        }

        let mut sorted = self.samples_ms.clone();
        sorted.sort_by(f64::total_cmp);

        Ok(RunStatistics {
            count: n as u64,
            success_count: self.success_count,
            fastest_ms: self.fastest_ms,
            slowest_ms: self.slowest_ms,
            mean_ms: self.total_ms / n as f64,
            median_ms: median_of_sorted(&sorted),
            total_ms: self.total_ms,
            largest_bytes: self.largest_bytes,
            smallest_bytes: self.smallest_bytes,
        })
    }
}

/// `(data[(n-1)/2] + data[n/2]) / 2` over an ascending, non-empty slice.
pub fn median_of_sorted(data: &[f64]) -> f64 {
    let n = data.len();
    (data[(n - 1) / 2] + data[n / 2]) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ms: f64, success: bool, size: u64) -> IterationResult {
        IterationResult {
            elapsed_ms: ms,
            success,
            status_code: if success { Some(200) } else { None },
            body_size_bytes: size,
        }
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median_of_sorted(&[10.0, 20.0, 30.0]), 20.0);
        assert_eq!(median_of_sorted(&[10.0, 20.0, 30.0, 40.0]), 25.0);
    }

    #[test]
    fn finalize_sorts_unordered_samples() {
        let mut agg = Aggregator::new();
        for ms in [40.0, 10.0, 30.0, 20.0] {
            agg.record(&sample(ms, true, 1));
        }
        let s = agg.finalize().unwrap();
        assert_eq!(s.median_ms, 25.0);
        assert_eq!(s.fastest_ms, 10.0);
        assert_eq!(s.slowest_ms, 40.0);
        assert_eq!(s.mean_ms, 25.0);
        assert_eq!(s.total_ms, 100.0);
        // insertion order is retained
        assert_eq!(agg.samples(), &[40.0, 10.0, 30.0, 20.0]);
    }

    #[test]
    fn empty_is_insufficient_data() {
        assert_eq!(Aggregator::new().finalize(), Err(ProbeError::InsufficientData));
    }

    #[test]
    fn failures_count_towards_samples_and_sizes() {
        let mut agg = Aggregator::with_capacity(3);
        agg.record(&sample(5.0, true, 500));
        agg.record(&sample(1.0, false, 0));
        agg.record(&sample(7.0, true, 300));
        let s = agg.finalize().unwrap();
        assert_eq!(agg.count(), 3);
        assert_eq!(s.count, 3);
        assert_eq!(s.success_count, 2);
        assert_eq!(s.largest_bytes, 500);
        assert_eq!(s.smallest_bytes, 0);
    }
}
