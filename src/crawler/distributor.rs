//! Work distribution across chapter download workers.
//!
//! Small novels are downloaded one chapter at a time. Larger ones are
//! spread over a bounded pool of tokio tasks that pull from a shared
//! queue pre-loaded with every chapter.

use super::{ChapterJob, FetchOutcome};
use crate::site::ChapterRef;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Upper bound on concurrent requests against the site.
pub const MAX_WORKERS: usize = 10;

/// Catalogs up to this size are downloaded sequentially.
const SEQUENTIAL_LIMIT: usize = 100;

/// Number of workers for a catalog of `chapters` entries.
///
/// One worker up to 100 chapters, then one more per started hundred,
/// capped at [`MAX_WORKERS`].
pub fn worker_count(chapters: usize) -> usize {
    if chapters <= SEQUENTIAL_LIMIT {
        return 1;
    }
    let extra = (chapters - SEQUENTIAL_LIMIT).div_ceil(SEQUENTIAL_LIMIT);
    (extra + 1).min(MAX_WORKERS)
}

/// Receives an event each time a chapter finishes.
pub trait ProgressSink: Send + Sync {
    fn chapter_finished(&self, outcome: &FetchOutcome, completed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(&FetchOutcome, usize, usize) + Send + Sync,
{
    fn chapter_finished(&self, outcome: &FetchOutcome, completed: usize, total: usize) {
        self(outcome, completed, total)
    }
}

/// Sink that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn chapter_finished(&self, _: &FetchOutcome, _: usize, _: usize) {}
}

/// Downloads every chapter exactly once and returns one outcome per chapter.
///
/// Outcomes are in arrival order, which only matches catalog order in
/// sequential mode.
pub async fn distribute(
    job: Arc<ChapterJob>,
    chapters: &[ChapterRef],
    progress: &dyn ProgressSink,
) -> Vec<FetchOutcome> {
    let total = chapters.len();
    let workers = worker_count(total);
    tracing::info!(chapters = total, workers, "starting chapter downloads");

    if workers == 1 {
        run_sequential(&job, chapters, progress).await
    } else {
        run_pool(job, chapters, workers, progress).await
    }
}

async fn run_sequential(
    job: &ChapterJob,
    chapters: &[ChapterRef],
    progress: &dyn ProgressSink,
) -> Vec<FetchOutcome> {
    let total = chapters.len();
    let mut outcomes = Vec::with_capacity(total);

    for chapter in chapters {
        let outcome = job.fetch_chapter(chapter).await;
        progress.chapter_finished(&outcome, outcomes.len() + 1, total);
        outcomes.push(outcome);
    }

    outcomes
}

async fn run_pool(
    job: Arc<ChapterJob>,
    chapters: &[ChapterRef],
    workers: usize,
    progress: &dyn ProgressSink,
) -> Vec<FetchOutcome> {
    let total = chapters.len();

    let (task_tx, task_rx) = flume::unbounded::<ChapterRef>();
    for chapter in chapters {
        // The receiver is alive until the pool is spawned below.
        let _ = task_tx.send(chapter.clone());
    }
    drop(task_tx);

    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut pool = JoinSet::new();

    for worker in 0..workers {
        let tasks = task_rx.clone();
        let results = result_tx.clone();
        let job = Arc::clone(&job);

        pool.spawn(async move {
            while let Ok(chapter) = tasks.recv_async().await {
                let outcome = job.fetch_chapter(&chapter).await;
                if results.send(outcome).is_err() {
                    break;
                }
            }
            tracing::debug!(worker, "worker finished");
        });
    }
    drop(task_rx);
    drop(result_tx);

    let mut outcomes = Vec::with_capacity(total);
    while outcomes.len() < total {
        match result_rx.recv().await {
            Some(outcome) => {
                progress.chapter_finished(&outcome, outcomes.len() + 1, total);
                outcomes.push(outcome);
            }
            // Every worker has exited before reporting all chapters.
            None => break,
        }
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "chapter worker terminated abnormally");
        }
    }

    if outcomes.len() < total {
        let reported: HashSet<u32> = outcomes.iter().map(|o| o.sequence).collect();
        for chapter in chapters.iter().filter(|c| !reported.contains(&c.sequence)) {
            let outcome =
                FetchOutcome::failed(chapter, "worker stopped before finishing this chapter");
            progress.chapter_finished(&outcome, outcomes.len() + 1, total);
            outcomes.push(outcome);
        }
    }

    outcomes
}
