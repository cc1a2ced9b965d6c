//! Site access: search, catalog and chapter pages of the novel host.
//!
//! This module defines the records produced from the site's pages and the
//! `SiteClient` that combines a `Transport` with a `PageExtractor`.

mod extract;
mod transport;

pub use extract::PageExtractor;
pub use transport::{FetchRequest, HttpTransport, Transport, decode_body};

use crate::config::SiteProfile;
use crate::error::CrawlError;
use crate::utils::parent_referer;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER};
use std::sync::Arc;
use url::Url;
use url::form_urlencoded;

/// One row of a search result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Position in the result list (1-based).
    pub sequence: u32,

    /// Novel title.
    pub title: String,

    /// Catalog URL, empty when the row had no link.
    pub url: String,
}

/// A chapter entry of a novel's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    /// Position in the catalog (1-based), the canonical ordering key.
    pub sequence: u32,

    /// Chapter title as listed.
    pub title: String,

    /// Absolute URL of the chapter page.
    pub url: Url,
}

/// Client for one novel site.
pub struct SiteClient {
    transport: Arc<dyn Transport>,
    extractor: PageExtractor,
    profile: SiteProfile,
    headers: HeaderMap,
}

impl SiteClient {
    /// Creates a client for the given profile on top of a transport.
    pub fn new(transport: Arc<dyn Transport>, profile: SiteProfile) -> Result<Self, CrawlError> {
        let extractor = PageExtractor::new(&profile.selectors, &profile.origin)?;
        let headers = build_headers(&profile)?;

        Ok(Self {
            transport,
            extractor,
            profile,
            headers,
        })
    }

    /// Searches the site for a title.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchHit>, CrawlError> {
        let url = parse_url(&self.profile.search_url())?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.profile.search_field, term)
            .finish();

        let mut headers = self.headers.clone();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(ORIGIN, header_value(self.profile.origin.trim_end_matches('/'))?);
        headers.insert(REFERER, header_value(&self.profile.root_url())?);

        let bytes = self
            .transport
            .fetch(FetchRequest::post(url, headers, body))
            .await?;

        Ok(self.extractor.extract_search_hits(&decode_text(&bytes)))
    }

    /// Fetches a catalog page and returns its chapter list.
    pub async fn chapter_list(&self, catalog_url: &str) -> Result<Vec<ChapterRef>, CrawlError> {
        let url = parse_url(catalog_url)?;

        let mut headers = self.headers.clone();
        headers.insert(REFERER, header_value(&self.profile.search_url())?);

        let bytes = self
            .transport
            .fetch(FetchRequest::get(url, headers))
            .await?;

        self.extractor.extract_chapter_refs(&decode_text(&bytes))
    }

    /// Fetches a chapter page and returns its body text.
    pub async fn chapter_body(&self, chapter_url: &Url) -> Result<String, CrawlError> {
        let mut headers = self.headers.clone();
        headers.insert(REFERER, header_value(&parent_referer(chapter_url))?);

        let bytes = self
            .transport
            .fetch(FetchRequest::get(chapter_url.clone(), headers))
            .await?;

        self.extractor.extract_chapter_body(&decode_text(&bytes))
    }
}

fn build_headers(profile: &SiteProfile) -> Result<HeaderMap, CrawlError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &profile.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| CrawlError::Parse(format!("invalid header name '{}': {}", name, e)))?;
        headers.insert(name, header_value(value)?);
    }
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, CrawlError> {
    HeaderValue::from_str(value)
        .map_err(|e| CrawlError::Parse(format!("invalid header value '{}': {}", value, e)))
}

fn parse_url(url: &str) -> Result<Url, CrawlError> {
    Url::parse(url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url, e)))
}

fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
