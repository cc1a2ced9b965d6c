//! Page extraction: projects parsed HTML onto search hits, chapter
//! references and chapter body text.
//!
//! Everything here is pure. Failures are returned to the caller and never
//! logged.

use super::{ChapterRef, SearchHit};
use crate::config::SelectorConfig;
use crate::error::CrawlError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled CSS selectors.
#[derive(Debug, Clone)]
struct Selectors {
    search_hits: Selector,
    chapters: Selector,
    body: Selector,
}

impl Selectors {
    fn compile(config: &SelectorConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            search_hits: parse_selector(&config.search_hits)?,
            chapters: parse_selector(&config.chapters)?,
            body: parse_selector(&config.body)?,
        })
    }
}

fn parse_selector(source: &str) -> Result<Selector, CrawlError> {
    Selector::parse(source)
        .map_err(|e| CrawlError::Parse(format!("invalid selector '{}': {}", source, e)))
}

/// Applies the site's selector contract to HTML documents.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    selectors: Selectors,
    origin: Url,
}

impl PageExtractor {
    /// Compiles the selectors and parses the origin used to absolutize links.
    pub fn new(selectors: &SelectorConfig, origin: &str) -> Result<Self, CrawlError> {
        let origin = Url::parse(origin)
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", origin, e)))?;

        Ok(Self {
            selectors: Selectors::compile(selectors)?,
            origin,
        })
    }

    /// Extracts result rows from a search page, in document order.
    ///
    /// A matched anchor without `href` still yields a hit, with an empty URL.
    pub fn extract_search_hits(&self, html: &str) -> Vec<SearchHit> {
        let doc = Html::parse_document(html);

        doc.select(&self.selectors.search_hits)
            .enumerate()
            .map(|(idx, elem)| SearchHit {
                sequence: (idx + 1) as u32,
                title: element_text(elem),
                url: elem.value().attr("href").unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Extracts the chapter index from a catalog page.
    ///
    /// The sequence number is the anchor's position among all matches, so an
    /// anchor without `href` is skipped but still consumes its number.
    pub fn extract_chapter_refs(&self, html: &str) -> Result<Vec<ChapterRef>, CrawlError> {
        let doc = Html::parse_document(html);

        let chapters: Vec<ChapterRef> = doc
            .select(&self.selectors.chapters)
            .enumerate()
            .filter_map(|(idx, elem)| {
                let href = elem.value().attr("href")?;
                let url = self.resolve(href)?;
                Some(ChapterRef {
                    sequence: (idx + 1) as u32,
                    title: element_text(elem),
                    url,
                })
            })
            .collect();

        if chapters.is_empty() {
            return Err(CrawlError::NoChaptersFound);
        }

        Ok(chapters)
    }

    /// Extracts the body text of a chapter page, exactly as found.
    pub fn extract_chapter_body(&self, html: &str) -> Result<String, CrawlError> {
        let doc = Html::parse_document(html);

        let text: String = doc
            .select(&self.selectors.body)
            .map(element_text)
            .collect();

        if text.is_empty() {
            return Err(CrawlError::EmptyContent);
        }

        Ok(text)
    }

    /// Resolves a catalog href against the site origin.
    fn resolve(&self, href: &str) -> Option<Url> {
        self.origin.join(href).ok()
    }
}

fn element_text(elem: ElementRef<'_>) -> String {
    elem.text().collect()
}
