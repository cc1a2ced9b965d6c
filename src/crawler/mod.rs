//! Novel download pipeline.
//!
//! A crawl creates the novel's workspace, reads the catalog and hands the
//! chapter list to the distributor, which runs one [`ChapterJob`] per
//! chapter and collects a [`FetchOutcome`] for each.

mod distributor;
mod job;
mod workspace;

pub use distributor::{MAX_WORKERS, NoProgress, ProgressSink, distribute, worker_count};
pub use job::{ChapterJob, chapter_filename};
pub use workspace::NovelWorkspace;

use crate::config::DownloadConfig;
use crate::error::CrawlError;
use crate::site::{ChapterRef, SiteClient};
use std::sync::Arc;

/// Result of downloading one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Sequence number of the chapter.
    pub sequence: u32,

    /// Chapter title.
    pub title: String,

    /// Whether the chapter file was written.
    pub success: bool,

    /// Failure description when `success` is false.
    pub detail: Option<String>,
}

impl FetchOutcome {
    pub fn succeeded(chapter: &ChapterRef) -> Self {
        Self {
            sequence: chapter.sequence,
            title: chapter.title.clone(),
            success: true,
            detail: None,
        }
    }

    pub fn failed(chapter: &ChapterRef, detail: impl Into<String>) -> Self {
        Self {
            sequence: chapter.sequence,
            title: chapter.title.clone(),
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// Summary of a finished crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Outcomes in the order they arrived.
    pub outcomes: Vec<FetchOutcome>,
}

impl CrawlReport {
    pub fn new(outcomes: Vec<FetchOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Failed chapters sorted by sequence number.
    pub fn failures(&self) -> Vec<&FetchOutcome> {
        let mut failures: Vec<&FetchOutcome> =
            self.outcomes.iter().filter(|o| !o.success).collect();
        failures.sort_by_key(|o| o.sequence);
        failures
    }
}

/// Downloads whole novels from one site.
pub struct Crawler {
    site: Arc<SiteClient>,
    config: DownloadConfig,
}

impl Crawler {
    pub fn new(site: Arc<SiteClient>, config: DownloadConfig) -> Self {
        Self { site, config }
    }

    pub fn site(&self) -> &SiteClient {
        &self.site
    }

    /// Downloads every chapter of the novel whose catalog is at `catalog_url`.
    ///
    /// The workspace is created before any request is made, so an existing
    /// novel directory aborts without touching the network. Catalog errors
    /// are returned; chapter errors end up in the report.
    pub async fn crawl(
        &self,
        title: &str,
        catalog_url: &str,
        progress: &dyn ProgressSink,
    ) -> Result<CrawlReport, CrawlError> {
        let workspace = NovelWorkspace::create(&self.config.output_directory, title)?;

        let chapters = self.site.chapter_list(catalog_url).await?;
        tracing::debug!(count = chapters.len(), "extracted chapter list");
        for chapter in &chapters {
            tracing::debug!(sequence = chapter.sequence, title = %chapter.title, url = %chapter.url);
        }

        let job = Arc::new(ChapterJob::new(
            Arc::clone(&self.site),
            workspace,
            self.config.delay_after_write(),
        ));
        let outcomes = distribute(job, &chapters, progress).await;

        Ok(CrawlReport::new(outcomes))
    }
}
