//! Failures of a single admin API call

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response arrived: connection refused, DNS failure or reset.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("No response within {0:?}")]
    Timeout(Duration),

    /// The API answered with a non-2xx status other than 401/403.
    ///
    /// `message` is the `{message}` field of the body, or the raw body.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// A request body could not be serialized.
    #[error("Cannot encode request: {0}")]
    Encode(String),

    /// The body was not the JSON shape the endpoint documents.
    #[error("Unexpected response: {message}")]
    Parse { message: String, body: Option<String> },
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// A parse error that keeps the offending body for logging.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// The HTTP status, for [`ApiError::Http`] only.
    pub fn status_code(&self) -> Option<u16> {
        if let Self::Http { status, .. } = self {
            Some(*status)
        } else {
            None
        }
    }

    /// Whether a fail-soft list endpoint turns this into an empty list.
    ///
    /// Network trouble and malformed bodies are soft; an HTTP status is not.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_kinds() {
        assert!(ApiError::parse("bad json").is_soft());
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_soft());
        assert!(!ApiError::http(500, "boom").is_soft());
        assert!(!ApiError::Encode("nan".into()).is_soft());
    }

    #[test]
    fn test_status_code() {
        assert_eq!(ApiError::http(401, "nope").status_code(), Some(401));
        assert_eq!(ApiError::parse("x").status_code(), None);
        assert_eq!(ApiError::http(404, "gone").to_string(), "HTTP 404: gone");
    }
}
