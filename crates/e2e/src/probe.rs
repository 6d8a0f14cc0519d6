//! Reachability probe for the admin panel

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Poll `url` until it answers with anything below 500.
///
/// Redirects to a login page count as reachable; the probe only proves the
/// shop is up before browser sessions are opened.
pub async fn wait_for_reachable(url: &str, timeout: Duration) -> E2eResult<usize> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("{} is reachable ({})", url, resp.status());
                return Ok(attempts);
            }
            Ok(resp) => {
                warn!("Probe of {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} ...", url);
                }
                if !e.is_connect() {
                    warn!("Probe error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout {
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }

    Err(E2eError::Unreachable {
        grid: url.to_string(),
        attempts,
    })
}
