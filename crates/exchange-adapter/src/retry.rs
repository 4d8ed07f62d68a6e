use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::ExchangeError;

/// Retries `op` up to `max_attempts` times with exponential backoff
/// (1s, 2s, 4s, ...), stopping immediately on a non-retryable error.
pub async fn with_retry<F, Fut, T>(max_attempts: u32, op_name: &str, mut op: F) -> Result<T, ExchangeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExchangeError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                let backoff = Duration::from_secs(1 << (attempt - 1));
                warn!("{op_name} attempt {attempt} failed retryably: {err}, retrying in {backoff:?}");
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(3, "test", || async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ExchangeError::Network("timeout".into()))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_non_retryable() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), ExchangeError> = with_retry(3, "test", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(ExchangeError::InvalidKey)
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), ExchangeError> = with_retry(3, "test", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(ExchangeError::ServerError("500".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
