//! CSV usage report.

use std::path::Path;

use hyper::body::Bytes;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::Method;

use crate::client::Body;
use crate::error::ApiError;
use crate::error::Error;
use crate::AdminClient;

/// File name the dashboard saves the report under.
pub const REPORT_FILE_NAME: &str = "report.csv";

impl AdminClient {
    /// Downloads the analytics CSV report.
    ///
    /// `cookie` is forwarded verbatim, for callers relaying a browser session.
    pub async fn download_report(&self, cookie: Option<&str>) -> Result<Bytes, Error> {
        let url = self.endpoint("/v1/admin/analytics/csv")?;

        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::InvalidHeader(format!("cookie: {}", e)))?;
            headers.insert(reqwest::header::COOKIE, value);
        }

        let response = self.send(Method::GET, url, Body::None, headers).await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        log::debug!("downloaded report ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Downloads the report and writes it to `path`, returning the byte count.
    pub async fn save_report(&self, path: impl AsRef<Path>) -> Result<usize, Error> {
        let bytes = self.download_report(None).await?;
        tokio::fs::write(path.as_ref(), &bytes).await?;
        Ok(bytes.len())
    }
}
