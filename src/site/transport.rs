//! HTTP transport: issues one request and returns the decoded body bytes.

use crate::error::CrawlError;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::header::{CONTENT_ENCODING, HeaderMap};
use reqwest::{Client, Method};
use std::io::Read;
use std::time::Duration;
use url::Url;

/// A single outbound request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: Url, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url,
            headers,
            body: None,
        }
    }

    pub fn post(url: Url, headers: HeaderMap, body: String) -> Self {
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body),
        }
    }
}

/// Something that can turn a request into response bytes.
///
/// Implementations must return the body already inflated when the server
/// declared `Content-Encoding: gzip`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<Vec<u8>, CrawlError>;
}

/// reqwest-backed transport sharing one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds the shared client. Without a timeout, requests wait indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, CrawlError> {
        // Bodies are inflated by `decode_body`, so the client must leave them alone.
        let mut builder = Client::builder().no_gzip();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<Vec<u8>, CrawlError> {
        let FetchRequest {
            method,
            url,
            headers,
            body,
        } = request;

        tracing::debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, url.clone()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "non-success status");
            return Err(CrawlError::HttpStatus(status.as_u16()));
        }

        let encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let raw = response.bytes().await?;
        tracing::debug!(%url, bytes = raw.len(), encoding = ?encoding, "response received");

        decode_body(encoding.as_deref(), &raw)
    }
}

/// Inflates a gzip body; any other encoding is passed through untouched.
///
/// `deflate` is advertised in the default header profile but is not decoded
/// here.
pub fn decode_body(content_encoding: Option<&str>, raw: &[u8]) -> Result<Vec<u8>, CrawlError> {
    let is_gzip = content_encoding
        .map(|e| e.trim().eq_ignore_ascii_case("gzip"))
        .unwrap_or(false);

    if !is_gzip {
        return Ok(raw.to_vec());
    }

    let mut decoded = Vec::new();
    GzDecoder::new(raw)
        .read_to_end(&mut decoded)
        .map_err(CrawlError::Decoding)?;
    Ok(decoded)
}
