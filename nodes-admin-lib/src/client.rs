//! Main AdminClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::SessionProvider;
use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::Error;
use crate::model::ErrorBody;
use crate::rate_limit::RequestGate;
use crate::rate_limit::RetryPolicy;

/// The client for the Nodes admin API.
///
/// Clones share one connection pool, session provider and request gate.
///
/// # Example
///
/// ```ignore
/// use nodes_admin_lib::{AdminClient, auth::StaticSession};
///
/// let client = AdminClient::builder()
///     .url("https://nodes-api.example.org")
///     .session_provider(StaticSession::new("session-token"))
///     .build()?;
///
/// assert!(client.check_auth().await?);
/// ```
#[derive(Clone)]
pub struct AdminClient {
    pub(crate) inner: Arc<AdminClientInner>,
}

pub(crate) struct AdminClientInner {
    base_url: String,
    session: Arc<dyn SessionProvider>,
    http_client: Client,
    timeout: Option<Duration>,
    retry: RetryPolicy,
    gate: RequestGate,
}

/// A request body.
pub(crate) enum Body {
    None,
    Json(serde_json::Value),
}

impl AdminClient {
    /// Starts building a client.
    pub fn builder() -> AdminClientBuilder<Missing, Missing> {
        AdminClientBuilder::new()
    }

    /// Checks whether the current session is accepted by the API.
    ///
    /// A rejected session yields `Ok(false)`; a missing `ok` flag counts as `false`.
    pub async fn check_auth(&self) -> Result<bool, Error> {
        let url = self.endpoint("/v1/auth/check")?;

        match self.get_json::<AuthCheck>(url).await {
            Ok(check) => Ok(check.ok),
            Err(Error::Auth(AuthError::Rejected { .. })) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Returns the base URL of the admin API.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the retry configuration.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry
    }

    /// Builds an absolute URL for an API path.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let raw = format!("{}{}", self.inner.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| Error::Api(ApiError::InvalidUrl(format!("{}: {}", raw, e))))
    }

    /// Sends a GET and decodes the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self
            .send(Method::GET, url, Body::None, HeaderMap::new())
            .await?;
        decode_json(response).await
    }

    /// Sends a request whose response body is ignored.
    pub(crate) async fn send_unit(&self, method: Method, url: Url, body: Body) -> Result<(), Error> {
        self.send(method, url, body, HeaderMap::new()).await?;
        Ok(())
    }

    /// Makes an authenticated request, retrying idempotent reads on transient failures.
    ///
    /// Returns the response only when its status is a success.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Body,
        headers: HeaderMap,
    ) -> Result<reqwest::Response, Error> {
        let session = self.inner.session.session().await?;
        let bearer = HeaderValue::from_str(&session.as_bearer())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let retries = if method == Method::GET {
            self.inner.retry.max_retries()
        } else {
            0
        };

        let mut attempt = 0;
        loop {
            let slot = self.inner.gate.enter().await;

            let mut request = self
                .inner
                .http_client
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .header(reqwest::header::AUTHORIZATION, bearer.clone())
                .header(reqwest::header::ACCEPT, "application/json");

            if let Body::Json(value) = &body {
                request = request.json(value);
            }

            if let Some(timeout) = self.inner.timeout {
                request = request.timeout(timeout);
            }

            log::debug!("{} {} (attempt {})", method, url, attempt + 1);

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if response.status().is_success() {
                        return Ok(response);
                    }
                    if status == 401 || status == 403 {
                        return Err(Error::Auth(AuthError::Rejected { status }));
                    }
                    ApiError::http(status, error_message(response).await)
                }
                Err(err) if err.is_timeout() => ApiError::Timeout(self.inner.timeout.unwrap_or_default()),
                Err(err) => ApiError::Transport(err),
            };

            drop(slot);
            if attempt >= retries || !self.inner.retry.should_retry(&error) {
                return Err(error.into());
            }

            let delay = self.inner.retry.delay(attempt);
            log::warn!("{} {} failed ({}), retrying in {:?}", method, url, error, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

/// Decodes a JSON response body, keeping the raw body on failure.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let body = response.text().await.map_err(ApiError::from)?;
    serde_json::from_str(&body).map_err(|e| {
        Error::Api(ApiError::parse_with_body(
            format!("Failed to parse response: {}", e),
            body,
        ))
    })
}

/// Extracts `{message}` from an error body, falling back to the raw text.
async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(error) => error.message,
        Err(_) => body,
    }
}

/// Response of the session check.
#[derive(Debug, Default, Deserialize)]
struct AuthCheck {
    #[serde(default)]
    ok: bool,
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// A required builder field that has not been given yet.
pub struct Missing;

/// A required builder field that has been given.
pub struct Set<T>(T);

/// Builder for constructing an [`AdminClient`].
///
/// `build` only exists once both required fields are given.
///
/// # Required Fields
///
/// - `url` - The admin API base URL
/// - `session_provider` - A [`SessionProvider`] implementation
pub struct AdminClientBuilder<Url, Provider> {
    url: Url,
    session: Provider,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    retry: RetryPolicy,
    gate: Option<RequestGate>,
}

impl AdminClientBuilder<Missing, Missing> {
    /// A builder with no URL, no session and default limits.
    pub fn new() -> Self {
        Self {
            url: Missing,
            session: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            retry: RetryPolicy::default(),
            gate: None,
        }
    }
}

impl Default for AdminClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> AdminClientBuilder<Missing, P> {
    /// Sets the admin API base URL.
    pub fn url(self, url: impl Into<String>) -> AdminClientBuilder<Set<String>, P> {
        AdminClientBuilder {
            url: Set(url.into()),
            session: self.session,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry: self.retry,
            gate: self.gate,
        }
    }
}

impl<U> AdminClientBuilder<U, Missing> {
    /// Sets the session provider.
    pub fn session_provider<T: SessionProvider + 'static>(
        self,
        provider: T,
    ) -> AdminClientBuilder<U, Set<Arc<dyn SessionProvider>>> {
        self.shared_session_provider(Arc::new(provider))
    }

    /// Sets a session provider shared with other clients.
    pub fn shared_session_provider(
        self,
        provider: Arc<dyn SessionProvider>,
    ) -> AdminClientBuilder<U, Set<Arc<dyn SessionProvider>>> {
        AdminClientBuilder {
            url: self.url,
            session: Set(provider),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry: self.retry,
            gate: self.gate,
        }
    }
}

impl<U, P> AdminClientBuilder<U, P> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Caps TCP and TLS connection setup.
    ///
    /// Ignored when a custom HTTP client is supplied.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// Replaces the default reqwest client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the retry policy for reads.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Shares a request gate with other clients.
    pub fn request_gate(mut self, gate: RequestGate) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl AdminClientBuilder<Set<String>, Set<Arc<dyn SessionProvider>>> {
    /// Builds the [`AdminClient`].
    ///
    /// Fails when the base URL does not parse or the HTTP client cannot be created.
    pub fn build(self) -> Result<AdminClient, Error> {
        let base_url = self.url.0;
        Url::parse(&base_url)
            .map_err(|e| Error::Api(ApiError::InvalidUrl(format!("{}: {}", base_url, e))))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(AdminClient {
            inner: Arc::new(AdminClientInner {
                base_url,
                session: self.session.0,
                http_client,
                timeout: self.timeout,
                retry: self.retry,
                gate: self.gate.unwrap_or_default(),
            }),
        })
    }
}
