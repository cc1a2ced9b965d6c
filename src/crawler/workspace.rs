//! Per-novel output directory.

use crate::error::CrawlError;
use crate::utils::sanitize_title;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory that receives one file per downloaded chapter.
#[derive(Debug, Clone)]
pub struct NovelWorkspace {
    base_dir: PathBuf,
    title: String,
    dir: PathBuf,
}

impl NovelWorkspace {
    /// Creates `<base_dir>/<title>`, creating `base_dir` on demand.
    ///
    /// Fails with `DirectoryExists` if the novel directory is already there;
    /// nothing is modified in that case.
    pub fn create(base_dir: &Path, title: &str) -> Result<Self, CrawlError> {
        let dir = base_dir.join(sanitize_title(title));

        if dir.exists() {
            return Err(CrawlError::DirectoryExists(dir));
        }

        std::fs::create_dir_all(base_dir)?;
        match std::fs::create_dir(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CrawlError::DirectoryExists(dir));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(dir = %dir.display(), "created novel directory");

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            title: title.to_string(),
            dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Resolved output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
