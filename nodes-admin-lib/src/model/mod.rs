//! Records exchanged with the admin API.

mod analytics;
mod attestation;
mod community;
mod envelope;
mod user;

pub use analytics::*;
pub use attestation::*;
pub use community::*;
pub use envelope::*;
pub use user::*;

use serde::Deserialize;
use serde::Deserializer;

/// Reads an explicit `null` the same as a missing field.
///
/// The API sends `null` for blank text and empty lists on older records.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
