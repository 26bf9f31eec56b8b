// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-bounded, cancellable execution of external calls.
//!
//! Every call to a collaborator (generation, embedding, speech, transport)
//! goes through [`CallBounds::run`], so a slow dependency becomes an ordinary
//! [`ColloquyError::Timeout`] and a shutdown request becomes
//! [`ColloquyError::Cancelled`].

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ColloquyError;

/// Default upper bound for a single external call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout and cancellation token applied to external calls.
#[derive(Debug, Clone)]
pub struct CallBounds {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallBounds {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs `fut` under these bounds.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ColloquyError>
    where
        F: Future<Output = Result<T, ColloquyError>>,
    {
        bounded(&self.cancel, self.timeout, fut).await
    }
}

impl Default for CallBounds {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT, CancellationToken::new())
    }
}

/// Runs `fut`, failing with `Timeout` after `limit` or `Cancelled` when the
/// token fires first.
pub async fn bounded<F, T>(
    cancel: &CancellationToken,
    limit: Duration,
    fut: F,
) -> Result<T, ColloquyError>
where
    F: Future<Output = Result<T, ColloquyError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ColloquyError::Cancelled),
        outcome = tokio::time::timeout(limit, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(ColloquyError::Timeout { duration: limit }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_bound() {
        let bounds = CallBounds::default();
        let value = bounds.run(async { Ok::<_, ColloquyError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_call_times_out() {
        let bounds = CallBounds::new(Duration::from_secs(120), CancellationToken::new());
        let result = bounds
            .run(async {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok::<_, ColloquyError>(())
            })
            .await;
        assert!(matches!(result, Err(ColloquyError::Timeout { duration }) if duration == Duration::from_secs(120)));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let result = bounded(&token, Duration::from_secs(5), async {
            Ok::<_, ColloquyError>(1)
        })
        .await;
        assert!(matches!(result, Err(ColloquyError::Cancelled)));
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let bounds = CallBounds::default();
        let result: Result<(), _> = bounds
            .run(async { Err(ColloquyError::Internal("boom".into())) })
            .await;
        assert!(matches!(result, Err(ColloquyError::Internal(msg)) if msg == "boom"));
    }
}
