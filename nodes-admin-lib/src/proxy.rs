//! Local report download proxy
//!
//! Serves `GET /api/download` on a local port and relays it to the admin
//! API's CSV endpoint with the caller's cookie and the client's session.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Method;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::AdminClient;

/// Path the proxy answers on.
pub const DOWNLOAD_PATH: &str = "/api/download";

/// Pause after a failed accept, so descriptor exhaustion does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A bound report proxy, ready to serve.
///
/// # Example
///
/// ```ignore
/// let proxy = ReportProxy::bind(client, "127.0.0.1:3000".parse()?).await?;
/// let cancel = CancellationToken::new();
/// proxy.serve(cancel.clone()).await?;
/// ```
pub struct ReportProxy {
    client: AdminClient,
    listener: TcpListener,
}

impl ReportProxy {
    /// Binds the listener. Port `0` picks a free port.
    pub async fn bind(client: AdminClient, addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("report proxy listening on {}", listener.local_addr()?);
        Ok(Self { client, listener })
    }

    /// The bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `cancel` fires.
    ///
    /// Each connection is served on its own task.
    pub async fn serve(self, cancel: CancellationToken) -> Result<(), Error> {
        loop {
            let (stream, peer) = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("report proxy stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => match survive_accept(accepted) {
                    Some(accepted) => accepted,
                    None => {
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                },
            };

            let client = self.client.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let client = client.clone();
                    async move { Ok::<_, Infallible>(handle(&client, req).await) }
                });
                let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    result = conn => {
                        if let Err(err) = result {
                            log::debug!("connection from {} ended: {}", peer, err);
                        }
                    }
                }
            });
        }
    }
}

/// Logs a failed accept and drops it; the listener stays usable after
/// per-connection failures such as EMFILE or ECONNABORTED.
fn survive_accept<T>(accepted: std::io::Result<T>) -> Option<T> {
    match accepted {
        Ok(accepted) => Some(accepted),
        Err(err) => {
            log::warn!("report proxy accept failed: {}", err);
            None
        }
    }
}

async fn handle(client: &AdminClient, req: Request<Incoming>) -> Response<Full<Bytes>> {
    if req.method() != Method::GET || req.uri().path() != DOWNLOAD_PATH {
        return respond(StatusCode::NOT_FOUND, "text/plain", Bytes::from_static(b"Not Found"));
    }

    let cookie = req
        .headers()
        .get(hyper::header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    drop(req);

    match client.download_report(cookie.as_deref()).await {
        Ok(csv) => respond(StatusCode::OK, "text/csv", csv),
        Err(err) => {
            log::warn!("report download failed: {}", err);
            let body = serde_json::json!({ "error": err.to_string() }).to_string();
            respond(StatusCode::INTERNAL_SERVER_ERROR, "application/json", Bytes::from(body))
        }
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(hyper::header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
