//! Authentication

mod session;

pub use session::SessionProvider;
pub use session::SessionToken;
pub use session::StaticSession;
