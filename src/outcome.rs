use serde_json::{json, Value};

/// Result of one probe request.
///
/// `error` is set if and only if the probe failed; `status_code` is set if
/// and only if a response was received (a non-200 response carries its status
/// and still counts as a failure).
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub success: bool,
    pub latency_ms: f64,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl RequestOutcome {
    /// A response arrived with status 200.
    pub fn ok(latency_ms: f64, status_code: u16) -> Self {
        RequestOutcome {
            success: true,
            latency_ms,
            status_code: Some(status_code),
            error: None,
        }
    }

    /// A response arrived, but with a non-200 status.
    pub fn rejected(latency_ms: f64, status_code: u16) -> Self {
        RequestOutcome {
            success: false,
            latency_ms,
            status_code: Some(status_code),
            error: Some(format!("HTTP {}", status_code)),
        }
    }

    /// No response at all: connection failure or timeout.
    pub fn failed(latency_ms: f64, error: impl Into<String>) -> Self {
        RequestOutcome {
            success: false,
            latency_ms,
            status_code: None,
            error: Some(error.into()),
        }
    }
}

/// Fixed decision-request document POSTed to the target on every probe.
///
/// The table key is an opaque routing parameter taken from the CLI; the probe
/// index makes each request identifiable in the target's own logs.
pub fn decide_payload(table_key: &str, probe: usize) -> Value {
    json!({
        "request_id": format!("slamcheck-{}", probe),
        "probe": probe,
        "table_key": table_key,
        "hand_id": format!("hand-{}", probe),
        "seat": 3,
        "button_seat": 1,
        "street": "preflop",
        "hole_cards": ["As", "Kd"],
        "stack": 10_000,
        "pot": 150,
        "to_call": 100,
        "min_raise": 200,
        "big_blind": 100
    })
}
