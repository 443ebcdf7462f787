use crate::stats::Stats;

/// Fixed service-level objectives a completed run is judged against.
pub const P95_SLO_MS: f64 = 200.0;
pub const P99_SLO_MS: f64 = 500.0;
pub const SUCCESS_RATE_SLO: f64 = 95.0;

/// Per-threshold results for a run that completed with at least one success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    pub p95_ok: bool,
    pub p99_ok: bool,
    pub rate_ok: bool,
}

impl Checks {
    pub fn passed(&self) -> bool {
        self.p95_ok && self.p99_ok && self.rate_ok
    }
}

/// A run that could not be judged is `Aborted`, which is a distinct state
/// from a run that completed and failed its thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Completed(Checks),
    Aborted { reason: String },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Completed(checks) if checks.passed())
    }
}

/// Derive the verdict from aggregated statistics. Pure function; the
/// zero-successful-outcomes case aborts instead of evaluating thresholds.
pub fn evaluate(stats: &Stats) -> Verdict {
    let Some(latency) = &stats.latency else {
        let reason = if stats.total == 0 {
            "no requests were sent".to_string()
        } else {
            "all requests failed".to_string()
        };
        return Verdict::Aborted { reason };
    };

    Verdict::Completed(Checks {
        p95_ok: latency.p95 < P95_SLO_MS,
        p99_ok: latency.p99 < P99_SLO_MS,
        rate_ok: stats.success_rate >= SUCCESS_RATE_SLO,
    })
}
