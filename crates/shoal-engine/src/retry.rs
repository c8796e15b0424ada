//! Bounded retry for transient remote faults
//!
//! Mutation calls are not retried in general; only the enumerated transient
//! fault classes (object busy finishing a prior operation, throttling) are,
//! and only within a caller-supplied window. Exhausting the window surfaces
//! the last fault.

use crate::clock::Clock;
use shoal_remote::RemoteFault;
use std::future::Future;
use std::time::Duration;

const RETRY_INTERVAL: Duration = Duration::from_secs(10);

pub async fn retry_when<T, F, Fut>(
    clock: &dyn Clock,
    timeout: Duration,
    mut call: F,
    retryable: impl Fn(&RemoteFault) -> bool,
) -> shoal_remote::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = shoal_remote::Result<T>>,
{
    let deadline = clock.now() + timeout;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(fault) if retryable(&fault) && clock.now() < deadline => {
                tracing::debug!(%fault, "transient fault, retrying");
                clock.sleep(RETRY_INTERVAL).await;
            }
            Err(fault) => return Err(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let clock = ManualClock::new();
        let attempts = Mutex::new(0u32);

        let result = retry_when(
            &clock,
            Duration::from_secs(600),
            || async {
                let mut n = attempts.lock().unwrap();
                *n += 1;
                if *n < 3 {
                    Err(RemoteFault::InvalidState {
                        kind: "cache replication group",
                        message: "still snapshotting".to_string(),
                    })
                } else {
                    Ok(*n)
                }
            },
            RemoteFault::is_invalid_state,
        )
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_window_exhaustion_surfaces_last_fault() {
        let clock = ManualClock::new();

        let result: shoal_remote::Result<()> = retry_when(
            &clock,
            Duration::from_secs(30),
            || async {
                Err(RemoteFault::InvalidState {
                    kind: "cache replication group",
                    message: "busy".to_string(),
                })
            },
            RemoteFault::is_invalid_state,
        )
        .await;

        assert!(matches!(result, Err(RemoteFault::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let clock = ManualClock::new();
        let attempts = Mutex::new(0u32);

        let result: shoal_remote::Result<()> = retry_when(
            &clock,
            Duration::from_secs(600),
            || async {
                *attempts.lock().unwrap() += 1;
                Err(RemoteFault::Api("500".to_string()))
            },
            RemoteFault::is_invalid_state,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(*attempts.lock().unwrap(), 1);
    }
}
