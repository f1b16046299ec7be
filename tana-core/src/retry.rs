//! Retry - Exponential Backoff for Individual Remote Calls
//!
//! TigerStyle: Deterministic, injectable time. All waiting goes through the
//! [`Sleeper`] seam so tests can assert the exact backoff schedule without
//! real delays.
//!
//! The discipline applies to single remote calls (existence check, create
//! call), never to a provisioning sequence as a whole.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::{
    RETRY_ATTEMPTS_DEFAULT, RETRY_ATTEMPTS_MAX, RETRY_BACKOFF_MULTIPLIER_DEFAULT,
    RETRY_BASE_DELAY_MS_DEFAULT, RETRY_DELAY_MS_MAX,
};
use crate::storage::{StorageError, StorageResult};

// =============================================================================
// RetryPolicy
// =============================================================================

/// Backoff configuration for transient failures of a single remote call.
///
/// Immutable and shared read-only across all provisioning calls. The delay
/// before attempt `n + 1` is `base_delay * backoff_multiplier^(n - 1)`,
/// capped at [`RETRY_DELAY_MS_MAX`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RetryPolicyWire")]
pub struct RetryPolicy {
    base_delay: Duration,
    max_attempts: u32,
    backoff_multiplier: f64,
}

/// Raw policy fields as a config loader supplies them; validated by
/// `TryFrom` before a [`RetryPolicy`] exists.
#[derive(Debug, Deserialize)]
struct RetryPolicyWire {
    base_delay: Duration,
    max_attempts: u32,
    backoff_multiplier: f64,
}

impl TryFrom<RetryPolicyWire> for RetryPolicy {
    type Error = StorageError;

    fn try_from(wire: RetryPolicyWire) -> StorageResult<Self> {
        Self::try_new(wire.base_delay, wire.max_attempts, wire.backoff_multiplier)
    }
}

impl RetryPolicy {
    /// Create a policy, rejecting values outside the documented invariants.
    ///
    /// # Errors
    /// Returns [`StorageError::Configuration`] if `max_attempts` is zero or
    /// above [`RETRY_ATTEMPTS_MAX`], or if `backoff_multiplier` is below 1.0.
    pub fn try_new(
        base_delay: Duration,
        max_attempts: u32,
        backoff_multiplier: f64,
    ) -> StorageResult<Self> {
        if max_attempts < 1 {
            return Err(StorageError::configuration(
                "retry policy needs at least one attempt",
            ));
        }
        if max_attempts > RETRY_ATTEMPTS_MAX {
            return Err(StorageError::configuration(format!(
                "max_attempts {max_attempts} exceeds ceiling {RETRY_ATTEMPTS_MAX}"
            )));
        }
        // Negated comparison so NaN is rejected as well.
        if !(backoff_multiplier >= 1.0) {
            return Err(StorageError::configuration(format!(
                "backoff multiplier must not shrink delays, got {backoff_multiplier}"
            )));
        }

        Ok(Self {
            base_delay,
            max_attempts,
            backoff_multiplier,
        })
    }

    /// Create a policy.
    ///
    /// # Panics
    /// Panics if `max_attempts` is zero or above [`RETRY_ATTEMPTS_MAX`], or if
    /// `backoff_multiplier` is below 1.0.
    #[must_use]
    pub fn new(base_delay: Duration, max_attempts: u32, backoff_multiplier: f64) -> Self {
        match Self::try_new(base_delay, max_attempts, backoff_multiplier) {
            Ok(policy) => policy,
            Err(error) => panic!("{error}"),
        }
    }

    /// Total attempt budget, first try included.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after failed attempt `attempt` (1-based) before the next.
    ///
    /// # Panics
    /// Panics if `attempt` is zero or not below the attempt budget; there is
    /// no delay after the final attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        // Preconditions
        assert!(attempt >= 1, "attempts are 1-based");
        assert!(
            attempt < self.max_attempts,
            "no delay after the final attempt ({} of {})",
            attempt,
            self.max_attempts
        );

        let factor = self.backoff_multiplier.powi(i32::try_from(attempt - 1).unwrap_or(i32::MAX));
        // Clamp in f64 seconds before constructing the Duration; the raw
        // exponential product can exceed Duration's range.
        let capped_secs = (self.base_delay.as_secs_f64() * factor)
            .min(Duration::from_millis(RETRY_DELAY_MS_MAX).as_secs_f64());
        Duration::from_secs_f64(capped_secs)
    }
}

impl Default for RetryPolicy {
    /// The table-storage classic: 3s base delay, 5 attempts, doubling.
    fn default() -> Self {
        Self::new(
            Duration::from_millis(RETRY_BASE_DELAY_MS_DEFAULT),
            RETRY_ATTEMPTS_DEFAULT,
            RETRY_BACKOFF_MULTIPLIER_DEFAULT,
        )
    }
}

// =============================================================================
// Sleeper
// =============================================================================

/// Injectable waiting seam for inter-attempt delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =============================================================================
// with_retry
// =============================================================================

/// Run `operation`, retrying transient failures per `policy`.
///
/// Permanent and configuration failures are surfaced immediately. When the
/// attempt budget is spent the last transient error is wrapped in
/// [`StorageError::Exhausted`].
///
/// # Errors
/// Returns the first non-transient error, or `Exhausted` after
/// `policy.max_attempts()` transient failures.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut operation: F,
) -> StorageResult<T>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = StorageResult<T>> + Send,
{
    let budget = policy.max_attempts();
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(operation = label, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() => {
                if attempt >= budget {
                    tracing::warn!(
                        operation = label,
                        attempts = budget,
                        %error,
                        "retry budget exhausted"
                    );
                    return Err(StorageError::exhausted(budget, error));
                }

                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    operation = label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "transient failure, backing off"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                tracing::warn!(operation = label, attempt, %error, "permanent failure");
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Test sleeper that records requested delays instead of waiting.
    #[derive(Debug, Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay_after(1), secs(3));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(secs(3), 5, 2.0);
        assert_eq!(policy.delay_after(1), secs(3));
        assert_eq!(policy.delay_after(2), secs(6));
        assert_eq!(policy.delay_after(3), secs(12));
        assert_eq!(policy.delay_after(4), secs(24));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy::new(secs(60), 20, 4.0);
        assert_eq!(
            policy.delay_after(10),
            Duration::from_millis(RETRY_DELAY_MS_MAX)
        );
    }

    #[test]
    fn test_huge_backoff_product_clamps_to_cap() {
        // Passes construction but its exponential product would overflow a
        // Duration; every late delay lands on the cap instead.
        let policy = RetryPolicy::new(secs(3), 50, 1000.0);
        let cap = Duration::from_millis(RETRY_DELAY_MS_MAX);
        assert_eq!(policy.delay_after(12), cap);
        assert_eq!(policy.delay_after(49), cap);
    }

    #[test]
    #[should_panic(expected = "at least one attempt")]
    fn test_zero_attempts_rejected() {
        let _ = RetryPolicy::new(secs(1), 0, 2.0);
    }

    #[test]
    fn test_try_new_rejects_bad_values() {
        assert!(matches!(
            RetryPolicy::try_new(secs(1), 0, 2.0),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            RetryPolicy::try_new(secs(1), RETRY_ATTEMPTS_MAX + 1, 2.0),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            RetryPolicy::try_new(secs(1), 5, 0.5),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            RetryPolicy::try_new(secs(1), 5, f64::NAN),
            Err(StorageError::Configuration(_))
        ));
    }

    #[test]
    fn test_deserialization_rejects_invalid_policy() {
        let json = r#"{
            "base_delay": { "secs": 3, "nanos": 0 },
            "max_attempts": 0,
            "backoff_multiplier": 0.5
        }"#;

        let result = serde_json::from_str::<RetryPolicy>(json);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("at least one attempt"), "got: {message}");
    }

    #[test]
    fn test_deserialization_accepts_valid_policy() {
        let json = r#"{
            "base_delay": { "secs": 3, "nanos": 0 },
            "max_attempts": 5,
            "backoff_multiplier": 2.0
        }"#;

        let policy: RetryPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy, RetryPolicy::default());
    }

    #[test]
    #[should_panic(expected = "no delay after the final attempt")]
    fn test_no_delay_after_final_attempt() {
        let policy = RetryPolicy::new(secs(1), 3, 2.0);
        let _ = policy.delay_after(3);
    }

    #[tokio::test]
    async fn test_first_try_success_never_sleeps() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::default();

        let result = with_retry(&policy, &sleeper, "exists", || async {
            Ok::<_, StorageError>(true)
        })
        .await;

        assert_eq!(result, Ok(true));
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_backoff_schedule_four_failures_then_success() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(secs(3), 5, 2.0);
        let calls = AtomicU32::new(0);

        let result = with_retry(&policy, &sleeper, "exists", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 4 {
                    Err(StorageError::transient("timeout"))
                } else {
                    Ok(true)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(true));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(sleeper.delays(), vec![secs(3), secs(6), secs(12), secs(24)]);
    }

    #[tokio::test]
    async fn test_exhaustion_makes_no_sixth_attempt() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(secs(3), 5, 2.0);
        let calls = AtomicU32::new(0);

        let result: StorageResult<bool> = with_retry(&policy, &sleeper, "exists", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::transient("throttled")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        match result.unwrap_err() {
            StorageError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 5);
                assert_eq!(*last, StorageError::transient("throttled"));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: StorageResult<bool> = with_retry(&policy, &sleeper, "create", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::permanent("authorization denied")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
        assert_eq!(
            result.unwrap_err(),
            StorageError::permanent("authorization denied")
        );
    }

    #[tokio::test]
    async fn test_single_attempt_budget() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(secs(1), 1, 2.0);

        let result: StorageResult<bool> = with_retry(&policy, &sleeper, "exists", || async {
            Err(StorageError::transient("timeout"))
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            StorageError::Exhausted { attempts: 1, .. }
        ));
        assert!(sleeper.delays().is_empty());
    }
}
