//! Retry policy for failed reads

use std::time::Duration;

use crate::error::ApiError;

/// Statuses a read is retried on unless the policy says otherwise.
const TRANSIENT_STATUSES: &[u16] = &[429, 502, 503, 504];

/// When and how often a failed read is sent again.
///
/// The delay starts at `base_delay` and doubles per retry up to `max_delay`.
///
/// ```
/// use std::time::Duration;
/// use nodes_admin_lib::rate_limit::RetryPolicy;
///
/// let policy = RetryPolicy::default()
///     .attempts(4)
///     .backoff(Duration::from_millis(100), Duration::from_secs(2));
/// assert_eq!(policy.delay(1), Duration::from_millis(200));
/// assert_eq!(RetryPolicy::none().max_retries(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    statuses: Vec<u16>,
    transport: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            statuses: TRANSIENT_STATUSES.to_vec(),
            transport: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            retries: 0,
            statuses: Vec::new(),
            transport: false,
            ..Self::default()
        }
    }

    pub fn attempts(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_delay = base;
        self.max_delay = max.max(base);
        self
    }

    /// Replaces the set of HTTP statuses worth retrying.
    pub fn statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    /// Whether connection failures and timeouts are retried.
    pub fn transport(mut self, enabled: bool) -> Self {
        self.transport = enabled;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.retries
    }

    /// Returns `true` if a read that failed with `error` may be sent again.
    pub fn should_retry(&self, error: &ApiError) -> bool {
        match error {
            ApiError::Http { status, .. } => self.statuses.contains(status),
            ApiError::Transport(_) | ApiError::Timeout(_) => self.transport,
            _ => false,
        }
    }

    /// Pause before retry number `retry` (0 for the first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}
