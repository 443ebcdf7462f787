use crate::config::Config;
use crate::error::HarnessError;
use crate::outcome::{decide_payload, RequestOutcome};
use isahc::error::ErrorKind;
use isahc::{HttpClient, Request};
use log::debug;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Issue `config.requests` probes against the decide endpoint, never keeping
/// more than `config.concurrent` requests in flight at once.
///
/// Every probe resolves to exactly one `RequestOutcome`; transport errors and
/// timeouts are absorbed into the outcome and never abort the run. The
/// returned sequence is in probe-index order regardless of completion order,
/// along with the wall-clock seconds from first dispatch to last resolution.
pub async fn run(
    client: &HttpClient,
    config: &Config,
) -> Result<(Vec<RequestOutcome>, f64), HarnessError> {
    if config.concurrent == 0 {
        return Err(HarnessError::Config(
            "concurrency must be at least 1".to_string(),
        ));
    }
    if config.requests == 0 {
        return Ok((Vec::new(), 0.0));
    }

    let semaphore = Arc::new(Semaphore::new(config.concurrent));
    let url = Arc::new(config.decide_url());
    let started = Instant::now();

    let mut handles = Vec::with_capacity(config.requests);
    for probe in 0..config.requests {
        let semaphore = Arc::clone(&semaphore);
        let client = client.clone();
        let url = Arc::clone(&url);
        let table_key = config.table_key.clone();

        handles.push(tokio::spawn(async move {
            // The semaphore is never closed, so acquire cannot fail. The
            // permit is dropped on every exit path once the probe resolves.
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore closed during dispatch");
            send_probe(&client, &url, &table_key, probe).await
        }));
    }

    // Awaiting handles in spawn order keeps outcome index == probe index.
    let mut outcomes = Vec::with_capacity(config.requests);
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => outcomes.push(RequestOutcome::failed(
                0.0,
                format!("probe task failed: {}", err),
            )),
        }
    }

    Ok((outcomes, started.elapsed().as_secs_f64()))
}

async fn send_probe(
    client: &HttpClient,
    url: &str,
    table_key: &str,
    probe: usize,
) -> RequestOutcome {
    let payload = decide_payload(table_key, probe);
    let request = match Request::post(url)
        .header("content-type", "application/json")
        .body(payload.to_string())
    {
        Ok(request) => request,
        Err(err) => return RequestOutcome::failed(0.0, err.to_string()),
    };

    let start = Instant::now();
    match client.send_async(request).await {
        Ok(response) => {
            let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            let status = response.status().as_u16();
            if status == 200 {
                RequestOutcome::ok(latency_ms, status)
            } else {
                debug!("probe {} rejected with HTTP {}", probe, status);
                RequestOutcome::rejected(latency_ms, status)
            }
        }
        Err(err) => {
            let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            if err.kind() == ErrorKind::Timeout {
                debug!("probe {} timed out", probe);
                RequestOutcome::failed(latency_ms, "timeout")
            } else {
                debug!("probe {} failed: {}", probe, err);
                RequestOutcome::failed(latency_ms, err.to_string())
            }
        }
    }
}
