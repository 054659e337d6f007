//! Authentication error types

/// Errors raised when the session cannot be used for a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session token is available.
    #[error("No active session")]
    MissingSession,

    /// The session has expired.
    #[error("Session expired")]
    SessionExpired,

    /// The API rejected the session (HTTP 401/403).
    #[error("Session rejected by the API (HTTP {status})")]
    Rejected { status: u16 },

    /// The session token cannot be sent as a header value.
    #[error("Invalid session token: {0}")]
    InvalidToken(String),
}
