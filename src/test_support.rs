//! Shared fixtures for unit tests: an in-memory transport and page builders.

use crate::error::CrawlError;
use crate::site::{FetchRequest, Transport};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

enum Canned {
    Page(String),
    Status(u16),
}

/// Transport serving canned pages keyed by absolute URL.
///
/// Unknown URLs answer 404. Every request is recorded.
#[derive(Default)]
pub struct FakeTransport {
    pages: Mutex<HashMap<String, Canned>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, html: String) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::Page(html));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::Status(status));
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<Vec<u8>, CrawlError> {
        let key = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        match self.pages.lock().unwrap().get(&key) {
            Some(Canned::Page(html)) => Ok(html.clone().into_bytes()),
            Some(Canned::Status(code)) => Err(CrawlError::HttpStatus(*code)),
            None => Err(CrawlError::HttpStatus(404)),
        }
    }
}

/// Search result page with one row per `(title, href)`.
pub fn search_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(title, href)| {
            format!(
                "<tr><td><a href=\"{}\">{}</a></td><td>作者</td></tr>",
                href, title
            )
        })
        .collect();
    format!(
        "<html><body><div id=\"wrapper\"><div id=\"main\"><div id=\"content\"><form>\
         <table class=\"grid\">{}</table></form></div></div></div></body></html>",
        rows
    )
}

/// Catalog page with one anchor per `(href, title)`.
pub fn catalog_page(chapters: &[(&str, &str)]) -> String {
    let items: String = chapters
        .iter()
        .map(|(href, title)| format!("<dd><a href=\"{}\">{}</a></dd>", href, title))
        .collect();
    format!(
        "<html><body><div id=\"list\"><dl>{}</dl></div></body></html>",
        items
    )
}

/// Chapter page whose content container holds `text`.
pub fn chapter_page(text: &str) -> String {
    format!(
        "<html><body><div id=\"content\">{}</div></body></html>",
        text
    )
}
