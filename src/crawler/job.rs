//! Single-chapter download: fetch, extract, save, pause.

use super::{FetchOutcome, NovelWorkspace};
use crate::error::CrawlError;
use crate::site::{ChapterRef, SiteClient};
use crate::utils::sanitize_title;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// File name for a chapter: `<4-digit sequence>-<sanitized title>.txt`.
pub fn chapter_filename(chapter: &ChapterRef) -> String {
    format!("{:04}-{}.txt", chapter.sequence, sanitize_title(&chapter.title))
}

/// Everything a worker needs to download chapters of one novel.
pub struct ChapterJob {
    site: Arc<SiteClient>,
    workspace: NovelWorkspace,
    delay_after_write: Duration,
}

impl ChapterJob {
    pub fn new(site: Arc<SiteClient>, workspace: NovelWorkspace, delay_after_write: Duration) -> Self {
        Self {
            site,
            workspace,
            delay_after_write,
        }
    }

    pub fn workspace(&self) -> &NovelWorkspace {
        &self.workspace
    }

    /// Downloads one chapter into the workspace.
    ///
    /// Never fails: any error is folded into an unsuccessful outcome.
    pub async fn fetch_chapter(&self, chapter: &ChapterRef) -> FetchOutcome {
        match self.save_chapter(chapter).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "saved chapter");
                if !self.delay_after_write.is_zero() {
                    tokio::time::sleep(self.delay_after_write).await;
                }
                FetchOutcome::succeeded(chapter)
            }
            Err(e) => {
                tracing::warn!(
                    sequence = chapter.sequence,
                    title = %chapter.title,
                    error = %e,
                    "chapter download failed"
                );
                FetchOutcome::failed(chapter, e.to_string())
            }
        }
    }

    async fn save_chapter(&self, chapter: &ChapterRef) -> Result<PathBuf, CrawlError> {
        let body = self.site.chapter_body(&chapter.url).await?;
        let path = self.workspace.dir().join(chapter_filename(chapter));
        tokio::fs::write(&path, body.as_bytes()).await?;
        Ok(path)
    }
}
