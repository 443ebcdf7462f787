use crate::outcome::RequestOutcome;

/// Below this many successful samples, p95 falls back to the median.
pub const P95_MIN_SAMPLES: usize = 20;
/// Below this many successful samples, p99 falls back to the maximum.
pub const P99_MIN_SAMPLES: usize = 100;

/// Latency distribution over successful outcomes only, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Aggregate over a completed run.
#[derive(Debug, Clone)]
pub struct Stats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_rate: f64, // percent
    pub total_time_seconds: f64,
    pub requests_per_second: f64,
    /// `None` when no probe succeeded; the aggregate-failure case.
    pub latency: Option<LatencyStats>,
}

/// Reduce an outcome sequence into run statistics. Pure: the outcome order
/// does not matter and nothing is mutated.
pub fn aggregate(outcomes: &[RequestOutcome], total_time_seconds: f64) -> Stats {
    let total = outcomes.len();
    let successful = outcomes.iter().filter(|o| o.success).count();
    let failed = total - successful;

    let success_rate = if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64 * 100.0
    };
    let requests_per_second = if total_time_seconds > 0.0 {
        total as f64 / total_time_seconds
    } else {
        0.0
    };

    let mut latencies: Vec<f64> = outcomes
        .iter()
        .filter(|o| o.success)
        .map(|o| o.latency_ms)
        .collect();
    latencies.sort_by(|a, b| a.partial_cmp(b).expect("latency is never NaN"));

    let latency = if latencies.is_empty() {
        None
    } else {
        Some(latency_stats(&latencies))
    };

    Stats {
        total,
        successful,
        failed,
        success_rate,
        total_time_seconds,
        requests_per_second,
        latency,
    }
}

fn latency_stats(sorted: &[f64]) -> LatencyStats {
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = median_of(sorted);

    // Percentile estimates are meaningless on tiny samples; substitute the
    // median / max below the sample thresholds instead of reporting noise.
    let p95 = if n >= P95_MIN_SAMPLES {
        nearest_rank(sorted, 0.95)
    } else {
        median
    };
    let p99 = if n >= P99_MIN_SAMPLES {
        nearest_rank(sorted, 0.99)
    } else {
        max
    };

    LatencyStats {
        min,
        max,
        mean,
        median,
        p95,
        p99,
    }
}

fn median_of(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Nearest-rank percentile: the ceil(q * n)-th smallest observed value.
fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.max(1) - 1]
}
