use std::time::Duration;

/// Retry budget for an external collaborator call. The default is zero
/// retries (fail fast); both stage clients take this as an injected seam.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_backoff: Duration::from_secs(1),
        }
    }

    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::none()
        }
    }

    /// Total attempts including the initial call.
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `attempt` (0-based), exponential with a
    /// cap and 25% jitter to avoid thundering herd.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let base = self.base_backoff * 2u32.pow(attempt.min(10));
        let base = base.min(Duration::from_secs(10));
        let jitter_ms = fastrand::u64(0..=(base.as_millis() as u64 / 4).max(1));
        base + Duration::from_millis(jitter_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fail_fast() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.attempts(), 1);
    }

    #[test]
    fn test_attempts_counts_initial_call() {
        assert_eq!(RetryPolicy::with_retries(3).attempts(), 4);
    }

    #[test]
    fn test_delay_grows_and_is_capped() {
        let policy = RetryPolicy::with_retries(8);
        let first = policy.delay_before(0);
        assert!(first >= Duration::from_secs(1));
        // 2^8 seconds would be 256s; the cap plus max jitter bounds it.
        let late = policy.delay_before(8);
        assert!(late <= Duration::from_secs(10) + Duration::from_millis(2500));
    }
}
