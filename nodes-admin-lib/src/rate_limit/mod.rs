//! Retry policy and concurrency cap for outgoing requests.
//!
//! Only reads are retried; a mutation is sent once whatever the policy says.

mod gate;
mod retry;

pub use gate::RequestGate;
pub use retry::RetryPolicy;
