use crate::config::{Config, HEALTH_TIMEOUT};
use crate::error::HarnessError;
use isahc::{config::Configurable, HttpClient, Request};
use log::debug;

/// Single preflight check against the target's health endpoint.
///
/// Only an HTTP 200 within the health timeout lets the run proceed; any
/// other status or transport error aborts before a single probe is sent, so
/// an unreachable target never pollutes the measured statistics.
pub async fn check(client: &HttpClient, config: &Config) -> Result<(), HarnessError> {
    let request = Request::get(config.health_url())
        .timeout(HEALTH_TIMEOUT)
        .body(())
        .map_err(|err| HarnessError::Preflight(err.to_string()))?;

    match client.send_async(request).await {
        Ok(response) => {
            let status = response.status().as_u16();
            if status == 200 {
                debug!("health check passed for {}", config.api);
                Ok(())
            } else {
                Err(HarnessError::Preflight(format!(
                    "{} returned HTTP {}",
                    config.health_url(),
                    status
                )))
            }
        }
        Err(err) => Err(HarnessError::Preflight(format!(
            "{} unreachable: {}",
            config.health_url(),
            err
        ))),
    }
}
