//! Keyed query cache
//!
//! Remote reads are registered under a [`QueryKey`] and shared by every
//! consumer mounted on that key: one request per key at a time, stale data
//! served while a refetch runs, and tag-based invalidation after mutations.

mod cache;
mod key;
mod options;
mod state;

pub use cache::QueryCache;
pub use cache::QueryHandle;
pub use key::Invalidate;
pub use key::QueryKey;
pub use key::tags;
pub use options::QueryOptions;
pub use state::QueryState;
