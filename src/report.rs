use crate::outcome::RequestOutcome;
use crate::stats::Stats;
use crate::verdict::{Checks, Verdict, P95_SLO_MS, P99_SLO_MS, SUCCESS_RATE_SLO};
use std::fmt::Write;

const FIELD_WIDTH: usize = 24; //  width of each field for formatting print
const MAX_FAILURES_SHOWN: usize = 5;

/// Render the run summary. Pure formatting: nothing upstream is mutated and
/// the output is deterministic for a given `Stats`/`Verdict` pair.
pub fn render(stats: &Stats, verdict: &Verdict, outcomes: &[RequestOutcome]) -> String {
    let mut out = String::new();

    writeln!(out, "{:<FIELD_WIDTH$}{}", "Total Requests:", stats.total).unwrap();
    writeln!(out, "{:<FIELD_WIDTH$}{}", "Successful:", stats.successful).unwrap();
    writeln!(out, "{:<FIELD_WIDTH$}{}", "Failed:", stats.failed).unwrap();
    writeln!(out, "{:<FIELD_WIDTH$}{:.2}%", "Success Rate:", stats.success_rate).unwrap();
    writeln!(out, "{:<FIELD_WIDTH$}{:.2}s", "Total Time:", stats.total_time_seconds).unwrap();
    writeln!(out, "{:<FIELD_WIDTH$}{:.2}", "Requests/sec:", stats.requests_per_second).unwrap();

    if let Some(latency) = &stats.latency {
        writeln!(out).unwrap();
        writeln!(out, "Latency (successful requests):").unwrap();
        writeln!(out, "{:<FIELD_WIDTH$}{}", " Min:", format_latency(latency.min)).unwrap();
        writeln!(out, "{:<FIELD_WIDTH$}{}", " Mean:", format_latency(latency.mean)).unwrap();
        writeln!(out, "{:<FIELD_WIDTH$}{}", " Median:", format_latency(latency.median)).unwrap();
        writeln!(out, "{:<FIELD_WIDTH$}{}", " p95:", format_latency(latency.p95)).unwrap();
        writeln!(out, "{:<FIELD_WIDTH$}{}", " p99:", format_latency(latency.p99)).unwrap();
        writeln!(out, "{:<FIELD_WIDTH$}{}", " Max:", format_latency(latency.max)).unwrap();
    }

    writeln!(out).unwrap();
    match verdict {
        Verdict::Completed(checks) => {
            render_checks(&mut out, stats, checks);
            let result = if checks.passed() { "PASSED" } else { "FAILED" };
            writeln!(out, "{:<FIELD_WIDTH$}{}", "Result:", result).unwrap();
        }
        Verdict::Aborted { reason } => {
            writeln!(out, "{:<FIELD_WIDTH$}ABORTED ({})", "Result:", reason).unwrap();
        }
    }

    render_failures(&mut out, outcomes);
    out
}

/// Exit code for the process: 0 only for a passed verdict.
pub fn exit_code(verdict: &Verdict) -> i32 {
    if verdict.passed() {
        0
    } else {
        1
    }
}

/*-------------------==| Private/Helpers |==----------------------- */

fn render_checks(out: &mut String, stats: &Stats, checks: &Checks) {
    // A completed verdict always has a latency block.
    let latency = stats
        .latency
        .as_ref()
        .expect("completed verdict without latency stats");

    writeln!(
        out,
        " [{}] p95 {} < {}",
        mark(checks.p95_ok),
        format_latency(latency.p95),
        format_latency(P95_SLO_MS)
    )
    .unwrap();
    writeln!(
        out,
        " [{}] p99 {} < {}",
        mark(checks.p99_ok),
        format_latency(latency.p99),
        format_latency(P99_SLO_MS)
    )
    .unwrap();
    writeln!(
        out,
        " [{}] success rate {:.2}% >= {:.0}%",
        mark(checks.rate_ok),
        stats.success_rate,
        SUCCESS_RATE_SLO
    )
    .unwrap();
}

fn render_failures(out: &mut String, outcomes: &[RequestOutcome]) {
    let failures: Vec<(usize, &RequestOutcome)> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.success)
        .collect();
    if failures.is_empty() {
        return;
    }

    writeln!(out).unwrap();
    writeln!(
        out,
        "First {} failed request(s):",
        failures.len().min(MAX_FAILURES_SHOWN)
    )
    .unwrap();
    for (index, outcome) in failures.into_iter().take(MAX_FAILURES_SHOWN) {
        let status = match outcome.status_code {
            Some(code) => code.to_string(),
            None => "-".to_string(),
        };
        writeln!(
            out,
            " #{:<6} status: {:<5} error: {}",
            index,
            status,
            outcome.error.as_deref().unwrap_or("unknown")
        )
        .unwrap();
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "FAIL"
    }
}

// convert into seconds if the value is greater than 1000ms
fn format_latency(value: f64) -> String {
    if value > 1000.0 {
        format!("{:.2}s", value / 1000.0)
    } else {
        format!("{:.2}ms", value)
    }
}
