use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::Instant;

use crate::error::{BootstrapError, Result};
use crate::models::Endpoint;

/// Block until a TCP connection to `endpoint` succeeds.
///
/// The default policy (`max_wait = None`) is fixed-interval infinite retry:
/// this function does not return until the dependency accepts a connection.
/// With a bound set, a `WaitTimeout` error is returned once the deadline
/// passes without a successful attempt.
pub async fn await_ready(
    endpoint: &Endpoint,
    poll_interval: Duration,
    max_wait: Option<Duration>,
) -> Result<()> {
    let started = Instant::now();
    loop {
        // Bound each attempt so a filtered port cannot stall the loop.
        let attempt = tokio::time::timeout(
            poll_interval.max(Duration::from_millis(50)),
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
        )
        .await;

        match attempt {
            Ok(Ok(_stream)) => {
                tracing::debug!(%endpoint, elapsed = ?started.elapsed(), "dependency reachable");
                return Ok(());
            }
            Ok(Err(error)) => {
                tracing::debug!(%endpoint, %error, "dependency not reachable yet");
            }
            Err(_elapsed) => {
                tracing::debug!(%endpoint, "connection attempt timed out");
            }
        }

        if let Some(limit) = max_wait {
            if started.elapsed() >= limit {
                return Err(BootstrapError::WaitTimeout {
                    host: endpoint.host.clone(),
                    port: endpoint.port,
                    waited: started.elapsed(),
                });
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}
