//! SessionProvider trait and SessionToken

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::AuthError;

/// The session token issued to a staff member by the login flow.
///
/// The admin API accepts it as a bearer token; the library never issues or
/// refreshes it.
#[derive(Clone)]
pub struct SessionToken {
    /// The raw token value.
    pub token: String,
    /// When the session expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    /// Creates a session token with unknown expiry.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Creates a session token with an expiration time.
    pub fn with_expiry(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Returns `true` if the session has expired.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Supplies the session used for every admin API request.
///
/// The surrounding application owns login and persistence; the client only
/// asks for the current session before each request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the current session.
    async fn session(&self) -> Result<SessionToken, AuthError>;
}

/// A session provider that always returns the same token.
///
/// # Example
///
/// ```
/// use nodes_admin_lib::auth::StaticSession;
///
/// let provider = StaticSession::new("my-session-token");
/// ```
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: SessionToken,
}

impl StaticSession {
    /// Creates a static provider from a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SessionToken::new(token),
        }
    }

    /// Creates a static provider from an existing session token.
    pub fn from_token(token: SessionToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn session(&self) -> Result<SessionToken, AuthError> {
        if self.token.token.is_empty() {
            return Err(AuthError::MissingSession);
        }
        if self.token.is_expired() {
            return Err(AuthError::SessionExpired);
        }
        Ok(self.token.clone())
    }
}
