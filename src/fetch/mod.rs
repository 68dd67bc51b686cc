//! Parallel retrieval of published year branches.
//!
//! One clone task per year, bounded by a worker pool; each task clones only
//! its year's branch into `output_dir/<year>`. A failed clone affects its
//! own year only. Outcomes are logged and collected in completion order.

use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{Semaphore, mpsc};

use crate::git;
use crate::publish::BranchTemplate;

/// Result of one year's clone task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOutcome {
    pub year: i32,
    pub success: bool,
}

/// Clones published year branches into year-named directories.
#[derive(Debug, Clone)]
pub struct Fetcher {
    remote: String,
    output_dir: PathBuf,
    template: BranchTemplate,
    max_workers: usize,
}

impl Fetcher {
    pub fn new(
        remote: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        template: BranchTemplate,
        max_workers: usize,
    ) -> Self {
        Self {
            remote: remote.into(),
            output_dir: output_dir.into(),
            template,
            max_workers,
        }
    }

    /// Clone one branch per year. Returns one outcome per submitted year,
    /// in completion order.
    pub async fn fetch_years(&self, years: impl IntoIterator<Item = i32>) -> Vec<FetchOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers.max(1)));
        let (tx, mut rx) = mpsc::channel(64);
        let mut submitted = 0usize;

        for year in years {
            submitted += 1;
            let remote = self.remote.clone();
            let branch = self.template.branch_name(year);
            let dest = self.output_dir.join(year.to_string());
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                let joined =
                    tokio::task::spawn_blocking(move || git::clone_branch(&remote, &branch, &dest))
                        .await;
                let success = match joined {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        error!("Cloning branch for {year} failed: {e}");
                        false
                    }
                    Err(e) => {
                        error!("Clone task for {year} panicked: {e}");
                        false
                    }
                };
                let _ = tx.send(FetchOutcome { year, success }).await;
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(submitted);
        while let Some(outcome) = rx.recv().await {
            if outcome.success {
                info!("Cloned branch for {} successfully", outcome.year);
            } else {
                warn!("Failed to clone branch for {}", outcome.year);
            }
            outcomes.push(outcome);
        }
        outcomes
    }
}

/// Descending year range, inclusive on both ends.
pub fn year_range_desc(from: i32, to: i32) -> Vec<i32> {
    (to..=from).rev().collect()
}
