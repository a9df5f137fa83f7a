pub mod openai;
pub mod proxy;

pub use openai::OpenAIClient;
pub use proxy::ProxyCommentary;

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const FIRST_BACKOFF: Duration = Duration::from_millis(250);

/// Run `call` up to `attempts` times, doubling the pause after each failure
pub(crate) async fn with_retries<F, Fut>(attempts: u32, mut call: F) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut delay = FIRST_BACKOFF;
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < attempts => {
                warn!(attempt, error = %e, "commentary call failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerbumError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retries(3, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(VerbumError::ExternalService("busy".to_string()))
            } else {
                Ok("ok".to_string())
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_retries(2, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(VerbumError::ExternalService("down".to_string()))
        })
        .await;

        assert!(matches!(result, Err(VerbumError::ExternalService(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
