use thiserror::Error;

/// Errors that terminate the run before a verdict can be produced.
///
/// Per-request failures are never represented here; they are absorbed into
/// `RequestOutcome` so one flaky probe cannot abort the rest of the run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("health check failed: {0}")]
    Preflight(String),

    #[error("http client error: {0}")]
    Client(#[from] isahc::Error),
}
