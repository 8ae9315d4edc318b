//! publisher::readiness
//!
//! Bounded exponential backoff for a repository that was just created.
//!
//! The remote platform provisions new repositories asynchronously, so the
//! first reads after a create can miss it. [`poll_until`] checks
//! immediately, then sleeps with a doubling interval (capped at
//! `max_interval`) until the check passes or `max_wait` has elapsed.
//!
//! Waits never drop below [`MIN_INTERVAL`] and the budget never exceeds
//! [`MAX_BUDGET`], whatever the policy says.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::core::config::ReadinessConfig;
use crate::forge::ForgeError;

/// Shortest sleep between two checks.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Longest total wait.
pub const MAX_BUDGET: Duration = Duration::from_millis(ReadinessConfig::MAX_WAIT_MS);

/// How polling ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The check passed.
    Ready { attempts: u32 },
    /// `max_wait` elapsed first.
    TimedOut { attempts: u32, waited: Duration },
}

/// Run `check` until it returns `true` or the wait budget is spent.
///
/// An `Err` from `check` stops polling and is returned as-is.
pub async fn poll_until<F, Fut>(policy: &ReadinessConfig, mut check: F) -> Result<PollOutcome, ForgeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ForgeError>>,
{
    let start = Instant::now();
    let deadline = start + policy.max_wait().min(MAX_BUDGET);
    let max_interval = policy.max_interval().max(MIN_INTERVAL);
    let mut interval = policy.initial_interval().clamp(MIN_INTERVAL, max_interval);
    let mut attempts = 0;

    loop {
        attempts += 1;
        if check().await? {
            return Ok(PollOutcome::Ready { attempts });
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(PollOutcome::TimedOut {
                attempts,
                waited: now - start,
            });
        }

        let wait = interval.min(deadline - now);
        debug!(attempt = attempts, wait_ms = wait.as_millis() as u64, "not ready yet");
        sleep(wait).await;

        interval = interval.saturating_mul(2).min(max_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn policy(initial: u64, max: u64, wait: u64) -> ReadinessConfig {
        ReadinessConfig {
            initial_interval_ms: initial,
            max_interval_ms: max,
            max_wait_ms: wait,
        }
    }

    #[tokio::test]
    async fn ready_immediately() {
        let outcome = poll_until(&policy(1, 2, 100), || async { Ok(true) })
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Ready { attempts: 1 });
    }

    #[tokio::test]
    async fn ready_after_retries() {
        let calls = Cell::new(0);
        let outcome = poll_until(&policy(1, 2, 5_000), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() >= 3;
            async move { Ok(ready) }
        })
        .await
        .unwrap();
        assert_eq!(outcome, PollOutcome::Ready { attempts: 3 });
    }

    #[tokio::test]
    async fn zero_budget_times_out_after_one_check() {
        let outcome = poll_until(&policy(0, 0, 0), || async { Ok(false) })
            .await
            .unwrap();
        assert!(matches!(outcome, PollOutcome::TimedOut { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn small_budget_times_out() {
        let outcome = poll_until(&policy(1, 4, 20), || async { Ok(false) })
            .await
            .unwrap();
        match outcome {
            PollOutcome::TimedOut { attempts, waited } => {
                assert!(attempts > 1);
                assert!(waited >= Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn zero_interval_does_not_spin() {
        let outcome = poll_until(&policy(0, 0, 100), || async { Ok(false) })
            .await
            .unwrap();
        match outcome {
            PollOutcome::TimedOut { attempts, .. } => {
                // 100ms budget at a 10ms floor is at most 11 checks.
                assert!(attempts <= 11, "{} checks in 100ms", attempts);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn huge_budget_does_not_overflow() {
        let outcome = poll_until(&policy(1, 2, u64::MAX), || async { Ok(true) })
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Ready { attempts: 1 });
    }

    #[tokio::test]
    async fn check_error_stops_polling() {
        let calls = Cell::new(0);
        let result = poll_until(&policy(1, 2, 5_000), || {
            calls.set(calls.get() + 1);
            async { Err(ForgeError::RateLimited) }
        })
        .await;
        assert_eq!(result, Err(ForgeError::RateLimited));
        assert_eq!(calls.get(), 1);
    }
}
