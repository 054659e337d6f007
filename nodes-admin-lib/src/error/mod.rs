//! Error types

mod api;
mod auth;

pub use api::*;
pub use auth::*;

/// Top-level error for every client, cache and proxy operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The admin API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session was missing or rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A query fetcher panicked before producing a result.
    #[error("Query fetcher for '{0}' panicked")]
    FetcherPanicked(String),

    /// A query settled without data (its request was superseded and dropped).
    #[error("Query '{0}' settled without data")]
    NoData(String),

    /// Local I/O failed (report file, proxy listener).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the underlying API error, if any.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` when the fail-soft boundary should swallow this error.
    pub fn is_soft(&self) -> bool {
        self.as_api().is_some_and(ApiError::is_soft)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Api(ApiError::Transport(err))
    }
}
