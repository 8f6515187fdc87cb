//! One deadline shared by every phase of a request.

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::error_handling::FetchError;

/// An absolute expiry time, or none for an unbounded request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<Instant>,
    budget: Duration,
}

impl Deadline {
    /// Starts the clock now.
    pub(crate) fn start(timeout: Option<Duration>) -> Self {
        Self {
            at: timeout.map(|budget| Instant::now() + budget),
            budget: timeout.unwrap_or_default(),
        }
    }

    /// Runs `fut`, failing with [`FetchError::Timeout`] if the deadline passes first.
    pub(crate) async fn bound<F, T>(&self, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        match self.at {
            None => fut.await,
            Some(at) => match timeout_at(at, fut).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(self.budget)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unbounded_passes_through() {
        let deadline = Deadline::start(None);
        let value = deadline.bound(async { Ok::<_, FetchError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_expiry_is_a_timeout() {
        let deadline = Deadline::start(Some(Duration::from_millis(20)));
        let err = deadline
            .bound(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, FetchError>(())
            })
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_deadline_is_shared_across_calls() {
        let deadline = Deadline::start(Some(Duration::from_millis(60)));
        deadline
            .bound(async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok::<_, FetchError>(())
            })
            .await
            .unwrap();
        let second = deadline
            .bound(async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                Ok::<_, FetchError>(())
            })
            .await;
        assert!(matches!(second, Err(FetchError::Timeout(_))));
    }
}
