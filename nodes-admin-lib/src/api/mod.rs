//! Admin API operations
//!
//! Each submodule adds endpoint methods to [`AdminClient`](crate::AdminClient).
//! List endpoints that back tables are "fail soft": transport and parse
//! failures degrade to an empty collection so views stay renderable.

mod analytics;
mod attestations;
mod communities;
mod members;
mod report;
mod users;

pub use members::NewMember;
pub use report::REPORT_FILE_NAME;

use crate::error::Error;

/// Degrades soft failures (transport, timeout, malformed body) to an empty value.
pub(crate) trait FailSoft<T> {
    fn or_empty(self, endpoint: &str) -> Result<T, Error>;
}

impl<T: Default> FailSoft<T> for Result<T, Error> {
    fn or_empty(self, endpoint: &str) -> Result<T, Error> {
        match self {
            Err(err) if err.is_soft() => {
                log::warn!("{} degraded to empty result: {}", endpoint, err);
                Ok(T::default())
            }
            other => other,
        }
    }
}
