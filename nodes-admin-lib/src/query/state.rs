//! Snapshot of a query as seen by a consumer.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use crate::error::Error;

/// What a mounted consumer renders: data, loading and error flags.
///
/// `data` survives a failed refetch, so `is_error()` and `data` can both be
/// set at once.
#[derive(Debug)]
pub struct QueryState<T> {
    /// Last successfully fetched (or optimistically written) data.
    pub data: Option<Arc<T>>,
    /// Error of the most recent fetch, cleared by the next success.
    pub error: Option<Arc<Error>>,
    /// A request for this key is in flight.
    pub is_fetching: bool,
    /// When `data` was last fetched.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryState<T> {
    /// No data yet and a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }

    /// The most recent fetch failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Data is present and the most recent fetch did not fail.
    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    /// Borrows the data, if any.
    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_fetching: false,
            updated_at: None,
        }
    }
}
