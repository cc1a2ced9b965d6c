//! biquge-dl - web novel downloader for xbiqugu-style novel sites.
//!
//! This library provides functionality for:
//! - Searching the site and reading a novel's chapter catalog
//! - Downloading chapter bodies to one text file per chapter
//! - Spreading large catalogs over a bounded pool of download workers

pub mod config;
pub mod console;
pub mod crawler;
pub mod error;
pub mod logging;
pub mod session;
pub mod site;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{Config, DownloadConfig, SelectorConfig, SiteProfile};
pub use console::Console;
pub use crawler::{
    ChapterJob, CrawlReport, Crawler, FetchOutcome, NoProgress, NovelWorkspace, ProgressSink,
    distribute, worker_count,
};
pub use error::{ConfigError, CrawlError};
pub use session::Session;
pub use site::{ChapterRef, HttpTransport, PageExtractor, SearchHit, SiteClient, Transport};
