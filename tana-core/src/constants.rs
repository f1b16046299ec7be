//! Constants - Named Limits and Defaults
//!
//! TigerStyle: All limits are explicit, named, and have units in the name.

/// Milliseconds per second.
pub const TIME_MS_PER_SEC: u64 = 1_000;

/// Default base delay before the first retry, in milliseconds.
///
/// Matches the classic table-storage exponential retry default of 3 seconds.
pub const RETRY_BASE_DELAY_MS_DEFAULT: u64 = 3 * TIME_MS_PER_SEC;

/// Default total attempt budget for a single remote call (first try included).
pub const RETRY_ATTEMPTS_DEFAULT: u32 = 5;

/// Default multiplier applied to the delay after each failed attempt.
pub const RETRY_BACKOFF_MULTIPLIER_DEFAULT: f64 = 2.0;

/// Upper bound on any single inter-attempt delay, in milliseconds.
///
/// Caps runaway exponential growth when callers configure large budgets.
pub const RETRY_DELAY_MS_MAX: u64 = 300 * TIME_MS_PER_SEC;

/// Hard ceiling on the attempt budget a policy may carry.
pub const RETRY_ATTEMPTS_MAX: u32 = 100;

/// Minimum table name length in bytes (storage service rule).
pub const TABLE_NAME_BYTES_MIN: usize = 3;

/// Maximum table name length in bytes (storage service rule).
pub const TABLE_NAME_BYTES_MAX: usize = 63;

/// Maximum connection string length in bytes.
pub const CONNECTION_STRING_BYTES_MAX: usize = 4_096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_sane() {
        assert!(TABLE_NAME_BYTES_MIN < TABLE_NAME_BYTES_MAX);
        assert!(RETRY_ATTEMPTS_DEFAULT >= 1);
        assert!(RETRY_ATTEMPTS_DEFAULT <= RETRY_ATTEMPTS_MAX);
        assert!(RETRY_BASE_DELAY_MS_DEFAULT < RETRY_DELAY_MS_MAX);
        assert!(RETRY_BACKOFF_MULTIPLIER_DEFAULT >= 1.0);
    }
}
