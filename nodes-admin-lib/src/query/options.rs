//! Query options

use std::time::Duration;

/// Per-query configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use nodes_admin_lib::query::QueryOptions;
///
/// let options = QueryOptions::default().with_stale_time(Duration::from_secs(60));
/// assert_eq!(options.stale_time, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// How long fetched data counts as fresh.
    ///
    /// A mount after this window refetches in the background while the stale
    /// data is still served. Default: zero (always refetch on mount).
    pub stale_time: Duration,
}

impl QueryOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stale time.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Data never goes stale on its own; only invalidation refetches it.
    pub fn never_stale() -> Self {
        Self {
            stale_time: Duration::MAX,
        }
    }
}
